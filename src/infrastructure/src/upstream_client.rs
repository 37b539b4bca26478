use async_trait::async_trait;
use reqwest::Client;
use shared::Error;

use domain::models::UpstreamRequest;
use domain::services::{ByteStream, InferenceUpstream};

use crate::http_client::{build_streaming_client, into_byte_stream, map_reqwest_error};

/// OpenAI-compatible `/v1/responses` endpoint called with a fixed bearer token.
#[derive(Clone)]
pub struct HttpInferenceUpstream {
    client: Client,
    api_token: String,
}

impl HttpInferenceUpstream {
    pub fn new(api_token: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            client: build_streaming_client()?,
            api_token: api_token.into(),
        })
    }
}

#[async_trait]
impl InferenceUpstream for HttpInferenceUpstream {
    async fn open_stream(
        &self,
        endpoint: &str,
        request: &UpstreamRequest,
    ) -> Result<ByteStream, Error> {
        let url = format!("{}/v1/responses", endpoint.trim_end_matches('/'));
        tracing::debug!(%url, model = %request.model, "Opening upstream stream");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        into_byte_stream(response)
    }
}

use async_trait::async_trait;
use reqwest::Client;
use shared::Error;

use domain::models::RelayRequest;
use domain::services::{ByteStream, RelayTransport};

use crate::http_client::{build_streaming_client, into_byte_stream, map_reqwest_error};

/// Posts chat requests to a running relay and exposes its event stream.
#[derive(Clone)]
pub struct HttpRelayClient {
    client: Client,
    base_url: String,
}

impl HttpRelayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            client: build_streaming_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RelayTransport for HttpRelayClient {
    async fn open_chat(&self, request: &RelayRequest) -> Result<ByteStream, Error> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        into_byte_stream(response)
    }
}

use async_trait::async_trait;
use reqwest::Client;
use shared::Error;
use std::time::Duration;

use domain::services::HealthProbe;

use crate::http_client::{build_probe_client, map_reqwest_error};

/// `GET {candidate}/health`, any 2xx counts as healthy.
pub struct HttpHealthProbe {
    client: Client,
}

impl HttpHealthProbe {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            client: build_probe_client(timeout)?,
        })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, base_url: &str) -> Result<(), Error> {
        let url = format!("{}/health", base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::HttpStatus {
                status: response.status().as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_success_and_failure() {
        let healthy = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&healthy)
            .await;

        let broken = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&broken)
            .await;

        let probe = HttpHealthProbe::new(Duration::from_secs(2)).unwrap();
        assert!(probe.probe(&healthy.uri()).await.is_ok());
        assert!(matches!(
            probe.probe(&broken.uri()).await,
            Err(Error::HttpStatus { status: 503 })
        ));
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let slow = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&slow)
            .await;

        let probe = HttpHealthProbe::new(Duration::from_millis(100)).unwrap();
        assert!(matches!(
            probe.probe(&slow.uri()).await,
            Err(Error::Unreachable(_))
        ));
    }
}

//! Upstream endpoint discovery
//!
//! Policy: a configured override is returned verbatim without probing.
//! Otherwise candidates are probed one after another, each bounded by its own
//! timeout, and the first healthy one wins. When every probe fails the
//! fallback is returned and a warning is logged.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use domain::services::{EndpointDiscovery, HealthProbe};
use infrastructure::config::UpstreamConfig;

pub struct EndpointResolver {
    override_url: Option<String>,
    candidates: Vec<String>,
    fallback: String,
    probe: Arc<dyn HealthProbe>,
    probe_timeout: Duration,
}

impl EndpointResolver {
    pub fn new(
        candidates: Vec<String>,
        fallback: impl Into<String>,
        probe: Arc<dyn HealthProbe>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            override_url: None,
            candidates,
            fallback: fallback.into(),
            probe,
            probe_timeout,
        }
    }

    pub fn with_override(mut self, override_url: Option<String>) -> Self {
        self.override_url = override_url;
        self
    }

    pub fn from_config(config: &UpstreamConfig, probe: Arc<dyn HealthProbe>) -> Self {
        Self::new(
            config.candidates.clone(),
            config.fallback_url(),
            probe,
            config.probe_timeout,
        )
        .with_override(config.override_url.clone())
    }

    async fn probe_candidate(&self, candidate: &str) -> bool {
        match tokio::time::timeout(self.probe_timeout, self.probe.probe(candidate)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::debug!(%candidate, error = %e, "Upstream probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(%candidate, timeout_ms = self.probe_timeout.as_millis() as u64, "Upstream probe timed out");
                false
            }
        }
    }
}

#[async_trait]
impl EndpointDiscovery for EndpointResolver {
    async fn resolve(&self) -> String {
        if let Some(url) = &self.override_url {
            return url.clone();
        }

        for candidate in &self.candidates {
            if self.probe_candidate(candidate).await {
                tracing::info!(endpoint = %candidate, "Upstream service found");
                return candidate.clone();
            }
        }

        tracing::warn!(
            fallback = %self.fallback,
            "Upstream service not found, using fallback"
        );
        self.fallback.clone()
    }
}

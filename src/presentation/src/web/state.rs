//! Application state for the Axum server

use anyhow::Result;
use std::sync::Arc;

use application::endpoint_resolver::EndpointResolver;
use application::relay_service::RelayService;
use infrastructure::config::Config;
use infrastructure::health_probe::HttpHealthProbe;
use infrastructure::upstream_client::HttpInferenceUpstream;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
}

impl AppState {
    pub fn new(relay: Arc<RelayService>) -> Self {
        Self { relay }
    }

    /// Wire the HTTP probe, resolver and upstream client from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let upstream_config = &config.upstream;
        let probe = Arc::new(HttpHealthProbe::new(upstream_config.probe_timeout)?);
        let resolver = EndpointResolver::from_config(upstream_config, probe);
        let upstream = HttpInferenceUpstream::new(upstream_config.api_token.clone())?;

        let relay = RelayService::new(
            Arc::new(resolver),
            Arc::new(upstream),
            upstream_config.model.clone(),
        );
        Ok(Self::new(Arc::new(relay)))
    }
}

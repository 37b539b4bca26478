//! Service traits at the seams between the relay core and its transports

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use shared::Error;
use std::pin::Pin;

use crate::entities::Routine;
use crate::models::{RelayRequest, UpstreamRequest};

/// Raw response body, chunk by chunk, in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// Reachability check for one candidate base URL.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, base_url: &str) -> Result<(), Error>;
}

/// Produces the base URL of the inference service. Never fails.
#[async_trait]
pub trait EndpointDiscovery: Send + Sync {
    async fn resolve(&self) -> String;
}

/// Opens a streamed inference call.
#[async_trait]
pub trait InferenceUpstream: Send + Sync {
    /// Resolves once the upstream answered with a success status; the stream
    /// then yields the body as it arrives.
    async fn open_stream(&self, endpoint: &str, request: &UpstreamRequest)
        -> Result<ByteStream, Error>;
}

/// The chat view's connection to the relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn open_chat(&self, request: &RelayRequest) -> Result<ByteStream, Error>;
}

/// Single named entry holding the whole routine.
pub trait TaskRepository: Send + Sync {
    fn load(&self) -> Result<Routine, Error>;
    fn save(&self, routine: &Routine) -> Result<(), Error>;
}

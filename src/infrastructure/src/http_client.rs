//! Shared reqwest plumbing for the relay's outbound calls

use futures::StreamExt;
use reqwest::{Client, ClientBuilder, Response};
use shared::Error;
use std::time::Duration;

use domain::services::ByteStream;

/// Client for long-lived streamed calls: no overall timeout, only a connect timeout.
pub fn build_streaming_client() -> Result<Client, Error> {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .tcp_nodelay(true) // Chunks should leave as soon as they arrive
        .build()
        .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Client for short probes.
pub fn build_probe_client(timeout: Duration) -> Result<Client, Error> {
    ClientBuilder::new()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Connection-level failures are `Unreachable`; everything else is `Network`.
pub fn map_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() {
        Error::Unreachable(err.to_string())
    } else if let Some(status) = err.status() {
        Error::HttpStatus {
            status: status.as_u16(),
        }
    } else {
        Error::Network(err.to_string())
    }
}

/// Reject non-success responses, otherwise hand back the body as a byte stream.
pub fn into_byte_stream(response: Response) -> Result<ByteStream, Error> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
        });
    }
    Ok(Box::pin(
        response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error)),
    ))
}

//! Axum-based relay server
//!
//! - `state` - shared relay service
//! - `routes` - route table and layers
//! - `handlers` - request handlers

pub mod handlers;
pub mod routes;
pub mod state;

use anyhow::Result;
use state::AppState;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct AxumServer {
    state: AppState,
}

impl AxumServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let app = routes::create_router(self.state);

        tracing::info!("Starting relay server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind: {}", e))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

pub fn parse_bind_address(bind_addr: &str) -> Result<SocketAddr> {
    bind_addr
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid bind address: {}", bind_addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        let addr = parse_bind_address("127.0.0.1:3000").unwrap();
        assert_eq!(addr.port(), 3000);
        assert!(parse_bind_address("localhost").is_err());
    }
}

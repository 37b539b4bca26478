pub mod config;
pub mod health_probe;
pub mod http_client;
pub mod relay_client;
pub mod task_store;
pub mod upstream_client;

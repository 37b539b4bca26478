//! Request handlers for the Axum server

pub mod chat;
pub mod health;

pub use chat::*;
pub use health::*;

pub mod answer_buffer;
pub mod chat_session;
pub mod context_builder;
pub mod endpoint_resolver;
pub mod payload_shapes;
pub mod relay_service;
pub mod response_parser;
pub mod stream_decoder;

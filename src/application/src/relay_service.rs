//! Chat relay: grounding, endpoint resolution and byte relay
//!
//! The returned stream has two producer states. While relaying, upstream
//! chunks go out unchanged and in order, pulled only as fast as the caller
//! consumes them. Failures switch to a single synthesized error frame and
//! the stream ends; a clean upstream close ends with one `[DONE]` frame.

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use shared::Error;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;

use domain::models::{ErrorEvent, RelayRequest, UpstreamRequest};
use domain::services::{ByteStream, EndpointDiscovery, InferenceUpstream};

use crate::context_builder::build_grounding;

pub type RelayStream = Pin<Box<dyn Stream<Item = Result<Bytes, Infallible>> + Send>>;

pub const DONE_FRAME: &str = "data: [DONE]\n\n";

pub fn event_frame(payload: &str) -> Bytes {
    Bytes::from(format!("data: {}\n\n", payload))
}

fn error_frame(message: String) -> Bytes {
    let payload = serde_json::to_string(&ErrorEvent::new(message))
        .unwrap_or_else(|_| r#"{"error":{"message":"Erro de conexão"}}"#.to_string());
    event_frame(&payload)
}

fn connection_error_message(error: &Error, endpoint: &str) -> String {
    format!(
        "Erro de conexão: {}. Certifique-se de que o serviço de inferência está rodando em {} (POST /v1/responses).",
        error, endpoint
    )
}

pub struct RelayService {
    discovery: Arc<dyn EndpointDiscovery>,
    upstream: Arc<dyn InferenceUpstream>,
    model: String,
}

impl RelayService {
    pub fn new(
        discovery: Arc<dyn EndpointDiscovery>,
        upstream: Arc<dyn InferenceUpstream>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            discovery,
            upstream,
            model: model.into(),
        }
    }

    /// Validate and start relaying. Only validation fails here; everything
    /// after that is reported inside the stream.
    pub fn handle(&self, request: RelayRequest) -> Result<RelayStream, Error> {
        let question = request.validated_message()?;
        let grounding = build_grounding(request.tasks(), question);

        tracing::info!(
            conversation_id = %request.conversation_id_or_default(),
            tasks = grounding.stats.total,
            pending = grounding.stats.pending,
            "Relaying chat message"
        );

        let connect = Connect {
            discovery: self.discovery.clone(),
            upstream: self.upstream.clone(),
            request: UpstreamRequest {
                model: self.model.clone(),
                input: grounding.text,
                stream: true,
                conversation_id: request.conversation_id_or_default().to_string(),
            },
        };

        Ok(Box::pin(relay(connect)))
    }
}

struct Connect {
    discovery: Arc<dyn EndpointDiscovery>,
    upstream: Arc<dyn InferenceUpstream>,
    request: UpstreamRequest,
}

enum RelayState {
    Connecting(Connect),
    Relaying {
        body: ByteStream,
        endpoint: String,
        /// Whether the last relayed chunk ended a line.
        at_line_start: bool,
    },
    Finished,
}

fn relay(connect: Connect) -> impl Stream<Item = Result<Bytes, Infallible>> + Send {
    stream::unfold(RelayState::Connecting(connect), |mut state| async move {
        loop {
            state = match state {
                RelayState::Connecting(connect) => {
                    let endpoint = connect.discovery.resolve().await;
                    match connect.upstream.open_stream(&endpoint, &connect.request).await {
                        Ok(body) => RelayState::Relaying {
                            body,
                            endpoint,
                            at_line_start: true,
                        },
                        Err(e) => {
                            tracing::error!(%endpoint, error = %e, "Upstream call failed");
                            let frame = error_frame(connection_error_message(&e, &endpoint));
                            return Some((Ok(frame), RelayState::Finished));
                        }
                    }
                }
                RelayState::Relaying {
                    mut body,
                    endpoint,
                    at_line_start,
                } => match body.next().await {
                    Some(Ok(chunk)) if chunk.is_empty() => RelayState::Relaying {
                        body,
                        endpoint,
                        at_line_start,
                    },
                    Some(Ok(chunk)) => {
                        tracing::debug!(bytes = chunk.len(), "Relaying chunk");
                        let ends_line = chunk.last() == Some(&b'\n');
                        let next = RelayState::Relaying {
                            body,
                            endpoint,
                            at_line_start: ends_line,
                        };
                        return Some((Ok(chunk), next));
                    }
                    Some(Err(e)) => {
                        tracing::error!(%endpoint, error = %e, "Upstream stream interrupted");
                        let frame = error_frame(connection_error_message(&e, &endpoint));
                        return Some((Ok(terminate_line(at_line_start, frame)), RelayState::Finished));
                    }
                    None => {
                        tracing::info!(%endpoint, "Upstream stream completed");
                        let frame = Bytes::from_static(DONE_FRAME.as_bytes());
                        return Some((Ok(terminate_line(at_line_start, frame)), RelayState::Finished));
                    }
                },
                RelayState::Finished => return None,
            };
        }
    })
}

/// Keeps a synthesized frame from being glued onto an unterminated upstream line.
fn terminate_line(at_line_start: bool, frame: Bytes) -> Bytes {
    if at_line_start {
        frame
    } else {
        let mut out = Vec::with_capacity(frame.len() + 1);
        out.push(b'\n');
        out.extend_from_slice(&frame);
        Bytes::from(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain::entities::TaskSnapshot;
    use std::sync::Mutex;

    struct FixedEndpoint;

    #[async_trait]
    impl EndpointDiscovery for FixedEndpoint {
        async fn resolve(&self) -> String {
            "http://upstream:8000".to_string()
        }
    }

    enum Script {
        Status(u16),
        Chunks(Vec<&'static str>),
        BrokenAfter(&'static str),
    }

    struct FakeUpstream {
        script: Script,
        calls: Mutex<Vec<(String, UpstreamRequest)>>,
    }

    impl FakeUpstream {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, UpstreamRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceUpstream for FakeUpstream {
        async fn open_stream(
            &self,
            endpoint: &str,
            request: &UpstreamRequest,
        ) -> Result<ByteStream, Error> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), request.clone()));
            match &self.script {
                Script::Status(status) => Err(Error::HttpStatus { status: *status }),
                Script::Chunks(chunks) => {
                    let items: Vec<Result<Bytes, Error>> = chunks
                        .iter()
                        .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                        .collect();
                    Ok(Box::pin(stream::iter(items)))
                }
                Script::BrokenAfter(chunk) => {
                    let items = vec![
                        Ok(Bytes::from_static(chunk.as_bytes())),
                        Err(Error::Network("connection reset".to_string())),
                    ];
                    Ok(Box::pin(stream::iter(items)))
                }
            }
        }
    }

    fn service(upstream: Arc<FakeUpstream>) -> RelayService {
        RelayService::new(Arc::new(FixedEndpoint), upstream, "gpt-4o")
    }

    async fn collect(stream: RelayStream) -> Vec<String> {
        stream
            .map(|chunk| match chunk {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(never) => match never {},
            })
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_without_upstream_call() {
        let upstream = FakeUpstream::new(Script::Chunks(vec![]));
        let relay = service(upstream.clone());

        let result = relay.handle(RelayRequest {
            message: Some(String::new()),
            ..Default::default()
        });

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_yields_single_error_frame() {
        let upstream = FakeUpstream::new(Script::Status(500));
        let relay = service(upstream.clone());

        let frames = collect(relay.handle(RelayRequest::new("oi", "c1", vec![])).unwrap()).await;

        assert_eq!(frames.len(), 1);
        let payload = frames[0]
            .strip_prefix("data: ")
            .and_then(|f| f.strip_suffix("\n\n"))
            .unwrap();
        let event: serde_json::Value = serde_json::from_str(payload).unwrap();
        let message = event["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Erro de conexão: HTTP error: 500"));
        assert!(message.contains("http://upstream:8000"));
        assert!(!frames[0].contains("[DONE]"));
    }

    #[tokio::test]
    async fn test_chunks_relayed_verbatim_then_done() {
        let upstream = FakeUpstream::new(Script::Chunks(vec![
            "data: {\"delta\":\"Ol\"}\n\n",
            "data: {\"del",
            "ta\":\"á\"}\n\n",
        ]));
        let relay = service(upstream.clone());

        let frames = collect(relay.handle(RelayRequest::new("oi", "c1", vec![])).unwrap()).await;

        assert_eq!(
            frames,
            vec![
                "data: {\"delta\":\"Ol\"}\n\n",
                "data: {\"del",
                "ta\":\"á\"}\n\n",
                DONE_FRAME,
            ]
        );
    }

    #[tokio::test]
    async fn test_done_frame_starts_on_a_new_line() {
        let upstream = FakeUpstream::new(Script::Chunks(vec!["data: sem fim"]));
        let relay = service(upstream);

        let frames = collect(relay.handle(RelayRequest::new("oi", "c1", vec![])).unwrap()).await;

        assert_eq!(frames, vec!["data: sem fim", "\ndata: [DONE]\n\n"]);
    }

    #[tokio::test]
    async fn test_interrupted_stream_ends_with_error_frame() {
        let upstream = FakeUpstream::new(Script::BrokenAfter("data: {\"delta\":\"a\"}\n\n"));
        let relay = service(upstream);

        let frames = collect(relay.handle(RelayRequest::new("oi", "c1", vec![])).unwrap()).await;

        assert_eq!(frames.len(), 2);
        assert!(frames[1].starts_with("data: {\"error\":{\"message\":\"Erro de conexão: Network error: connection reset"));
        assert!(frames.iter().all(|f| !f.contains("[DONE]")));
    }

    #[tokio::test]
    async fn test_upstream_receives_grounding() {
        let upstream = FakeUpstream::new(Script::Chunks(vec![]));
        let relay = service(upstream.clone());
        let tasks = vec![TaskSnapshot {
            title: "Exercício".to_string(),
            time: Some("07:00".to_string()),
            completed: false,
            description: None,
            is_weekend: false,
        }];

        let request = RelayRequest {
            message: Some("o que tenho pra hoje?".to_string()),
            conversation_id: None,
            tasks: Some(tasks),
        };
        let frames = collect(relay.handle(request).unwrap()).await;
        assert_eq!(frames, vec![DONE_FRAME]);

        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        let (endpoint, sent) = &calls[0];
        assert_eq!(endpoint, "http://upstream:8000");
        assert_eq!(sent.model, "gpt-4o");
        assert!(sent.stream);
        assert_eq!(sent.conversation_id, "default");
        assert!(sent.input.contains("- Exercício (07:00) - Pendente"));
        assert!(sent.input.contains("PERGUNTA DO USUÁRIO: o que tenho pra hoje?"));
    }

    #[test]
    fn test_event_frame_format() {
        assert_eq!(&event_frame("{\"delta\":\"x\"}")[..], b"data: {\"delta\":\"x\"}\n\n");
    }
}

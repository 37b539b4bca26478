//! Chat view controller
//!
//! Drives one exchange at a time: append the user's message, open the relay
//! stream, and keep the assistant message in sync with the parser. The
//! controller always leaves the assistant message settled, holding either
//! answer text or one readable error.

use futures::StreamExt;
use shared::types::MessageId;
use shared::Error;
use std::sync::Arc;

use domain::entities::{ChatMessage, ChatSession, TaskSnapshot};
use domain::models::RelayRequest;
use domain::services::{ByteStream, RelayTransport};

use crate::response_parser::{AnswerOutcome, ParseProgress, ResponseParser};

pub const THINKING_PLACEHOLDER: &str = "Pensando...";

pub const UNREACHABLE_MESSAGE: &str = "Para usar o chat com IA, o relay precisa estar rodando:

1. Abra um terminal
2. Execute: routine serve

O serviço de inferência também deve estar ativo para responder em /v1/responses.";

pub const INTERRUPTED_MESSAGE: &str = "Resposta interrompida.";

/// Anything that displays chat messages. Called after every change.
pub trait ChatView {
    fn render(&mut self, message: &ChatMessage);
}

pub fn user_facing_error(error: &Error) -> String {
    if error.is_unreachable() {
        return UNREACHABLE_MESSAGE.to_string();
    }
    match error {
        Error::HttpStatus { status } => format!("Erro: HTTP {}", status),
        other => format!("Erro: {}", other),
    }
}

pub struct ChatController {
    transport: Arc<dyn RelayTransport>,
    session: ChatSession,
}

impl ChatController {
    pub fn new(transport: Arc<dyn RelayTransport>) -> Self {
        Self::with_session(transport, ChatSession::start())
    }

    pub fn with_session(transport: Arc<dyn RelayTransport>, session: ChatSession) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Run one exchange. Returns the assistant message id, or `None` when the
    /// input is blank and nothing was sent.
    ///
    /// Dropping the returned future abandons the exchange and closes the
    /// connection; call `abandon_pending` afterwards to settle the message.
    pub async fn send(
        &mut self,
        input: &str,
        tasks: Vec<TaskSnapshot>,
        view: &mut dyn ChatView,
    ) -> Option<MessageId> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        let user = self.session.push_user(text);
        render(&self.session, view, user);
        let reply = self.session.push_assistant_placeholder();
        render(&self.session, view, reply);

        let request = RelayRequest::new(text, self.session.conversation_id(), tasks);
        let content = match self.transport.open_chat(&request).await {
            Ok(body) => {
                refresh(&mut self.session, view, reply, THINKING_PLACEHOLDER, true);
                self.consume(body, reply, view).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                user_facing_error(&e)
            }
        };

        refresh(&mut self.session, view, reply, &content, false);
        Some(reply)
    }

    /// Settle an assistant message left loading by a dropped `send`.
    pub fn abandon_pending(&mut self, view: &mut dyn ChatView) -> Option<MessageId> {
        let pending = self.session.messages().iter().rev().find(|m| m.loading)?;
        let id = pending.id;
        let content = if pending.content.is_empty() || pending.content == THINKING_PLACEHOLDER {
            INTERRUPTED_MESSAGE.to_string()
        } else {
            pending.content.clone()
        };
        refresh(&mut self.session, view, id, &content, false);
        Some(id)
    }

    async fn consume(&mut self, mut body: ByteStream, reply: MessageId, view: &mut dyn ChatView) -> String {
        let mut parser = ResponseParser::new();
        let mut transport_error = None;
        let session = &mut self.session;

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    let progress =
                        parser.feed(&bytes, |text| refresh(session, view, reply, text, false));
                    if progress == ParseProgress::Done {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Chat stream interrupted");
                    transport_error = Some(e);
                    break;
                }
            }
        }
        drop(body);

        let answer = parser.finish(|text| refresh(session, view, reply, text, false));
        match (answer.outcome, transport_error) {
            (AnswerOutcome::Fallback, Some(e)) => user_facing_error(&e),
            _ => answer.content,
        }
    }
}

fn refresh(session: &mut ChatSession, view: &mut dyn ChatView, id: MessageId, content: &str, loading: bool) {
    if session.update(id, content, loading) {
        render(session, view, id);
    }
}

fn render(session: &ChatSession, view: &mut dyn ChatView, id: MessageId) {
    if let Some(message) = session.message(id) {
        view.render(message);
    }
}

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::types::{ConversationId, MessageId};

/// First assistant message of every session.
pub const GREETING: &str = "Olá! Sou seu assistente de rotina pessoal. Posso te ajudar com dicas de produtividade, análise das suas tarefas ou responder perguntas sobre organização pessoal. Como posso te ajudar hoje?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub loading: bool,
}

/// One chat view's conversation. Messages are only ever appended; assistant
/// messages are mutated in place while their response streams in.
#[derive(Debug, Clone)]
pub struct ChatSession {
    conversation_id: ConversationId,
    messages: Vec<ChatMessage>,
    next_id: MessageId,
}

impl ChatSession {
    /// Start a session with a fresh conversation id and the greeting message.
    pub fn start() -> Self {
        Self::with_conversation_id(generate_conversation_id())
    }

    pub fn with_conversation_id(conversation_id: impl Into<ConversationId>) -> Self {
        let mut session = Self {
            conversation_id: conversation_id.into(),
            messages: Vec::new(),
            next_id: 1,
        };
        session.push(Role::Assistant, GREETING.to_string(), false);
        session
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> MessageId {
        self.push(Role::User, content.into(), false)
    }

    /// Empty assistant message in the loading state.
    pub fn push_assistant_placeholder(&mut self) -> MessageId {
        self.push(Role::Assistant, String::new(), true)
    }

    /// Overwrite the content and loading flag of a message. Returns false for unknown ids.
    pub fn update(&mut self, id: MessageId, content: &str, loading: bool) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.content.clear();
                message.content.push_str(content);
                message.loading = loading;
                message.timestamp = Utc::now();
                true
            }
            None => false,
        }
    }

    fn push(&mut self, role: Role, content: String, loading: bool) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            content,
            timestamp: Utc::now(),
            loading,
        });
        id
    }
}

/// `conv_<millis>_<9 base36 chars>`
pub fn generate_conversation_id() -> ConversationId {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("conv_{}_{}", Utc::now().timestamp_millis(), suffix)
}

use serde::{Deserialize, Serialize};
use shared::Error;

use crate::entities::TaskSnapshot;

pub const EMPTY_MESSAGE_ERROR: &str = "Mensagem é obrigatória";

/// Conversation id forwarded upstream when the caller sends none.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub tasks: Option<Vec<TaskSnapshot>>,
}

impl RelayRequest {
    pub fn new(
        message: impl Into<String>,
        conversation_id: impl Into<String>,
        tasks: Vec<TaskSnapshot>,
    ) -> Self {
        Self {
            message: Some(message.into()),
            conversation_id: Some(conversation_id.into()),
            tasks: Some(tasks),
        }
    }

    /// The question, rejecting a missing or blank message.
    pub fn validated_message(&self) -> Result<&str, Error> {
        match self.message.as_deref() {
            Some(message) if !message.trim().is_empty() => Ok(message),
            _ => Err(Error::InvalidInput(EMPTY_MESSAGE_ERROR.to_string())),
        }
    }

    pub fn tasks(&self) -> &[TaskSnapshot] {
        self.tasks.as_deref().unwrap_or(&[])
    }

    pub fn conversation_id_or_default(&self) -> &str {
        self.conversation_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_ID)
    }
}

/// Body of `POST {endpoint}/v1/responses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamRequest {
    pub model: String,
    pub input: String,
    pub stream: bool,
    pub conversation_id: String,
}

/// Error-shaped event payload: `{"error":{"message":"..."}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

impl ErrorEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
            },
        }
    }
}

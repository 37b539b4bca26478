pub type Result<T> = anyhow::Result<T>;

// Common types
pub type ConversationId = String;
pub type TaskId = u64;
pub type MessageId = u64;

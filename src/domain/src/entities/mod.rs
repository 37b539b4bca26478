pub mod chat_session;
pub mod task;

pub use chat_session::{ChatMessage, ChatSession, Role};
pub use task::{Routine, RoutineKind, Task, TaskSnapshot};

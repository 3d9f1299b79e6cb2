use serde::{Deserialize, Serialize};

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation.
///
/// Identifiers are time-derived milliseconds, bumped by the store so they are
/// strictly monotonic even when two messages land in the same millisecond.
/// An assistant message is mutable only while its stream is active; it is
/// frozen once the stream completes or errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

impl Message {
    pub fn new(id: i64, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn user(id: i64, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content)
    }

    /// An empty assistant message, the placeholder a stream writes into.
    pub fn assistant_placeholder(id: i64) -> Self {
        Self::new(id, Role::Assistant, String::new())
    }
}

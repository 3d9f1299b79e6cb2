use serde::{Deserialize, Serialize};

use crate::message::Message;

pub const DEFAULT_TITLE: &str = "New Conversation";

/// A conversation: a titled, ordered message sequence.
///
/// The message sequence is append-only while a turn is running and is only
/// ever truncated by retry/regenerate. `in_flight` holds the id of the
/// assistant message currently receiving stream deltas; it is a runtime
/// marker, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(skip)]
    pub in_flight: Option<i64>,
}

impl Conversation {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            in_flight: None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// The persisted shape of the conversation list: ids and titles only.
/// Message history is stored separately, keyed by conversation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMeta {
    pub id: u64,
    pub title: String,
}

impl From<&Conversation> for ConversationMeta {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            title: conversation.title.clone(),
        }
    }
}

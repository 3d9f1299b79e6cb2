//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `chat-core` (pure Rust).
//! Implementations live in `chat-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;

use chat_types::{
    message::{Message, Role},
    Result,
};

// ─── Chat Port ───────────────────────────────────────────────

/// Raw body chunks from an open streaming response. The decoder reassembles
/// these into SSE events; chunk boundaries carry no meaning.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>>>>;

/// A message as it appears on the wire: role and content only.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

impl WireMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: match message.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: message.content.clone(),
        }
    }
}

/// Request forwarded through the chat proxy. The credential travels as a
/// bearer header, never inside the JSON body.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
    pub api_key: String,
}

#[async_trait(?Send)]
pub trait ChatPort {
    /// Open a streaming completion and return the raw body chunks.
    async fn stream_chat(&self, req: &ChatRequest) -> Result<ByteStream>;

    /// Non-streamed completion — returns `choices[0].message.content`.
    /// Used for title generation.
    async fn complete(&self, req: &ChatRequest) -> Result<String>;
}

// ─── Storage Port ────────────────────────────────────────────

/// String-keyed key-value storage with JSON-encoded values, the shape of
/// browser localStorage. Async so persistent backends can suspend.
#[async_trait(?Send)]
pub trait StoragePort {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Speech Port ─────────────────────────────────────────────

#[async_trait(?Send)]
pub trait TtsPort {
    /// Speak the given text. Implementations own the fallback policy;
    /// an error means no audio was produced at all.
    async fn speak(&self, text: &str) -> Result<()>;
}

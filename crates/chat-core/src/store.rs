//! Conversation store — the single owner of all conversation state.
//!
//! All reads and writes go through explicit operations here; persistence is
//! an explicit boundary (load on init, save a snapshot after each mutation)
//! rather than scattered writes. Message mutation during a stream happens
//! only through `append_delta` on the one in-flight message.

use std::collections::{BTreeMap, HashMap};

use chat_types::{
    config::{ChatConfig, ModelChoice},
    conversation::{Conversation, ConversationMeta, DEFAULT_TITLE},
    message::{Message, Role},
    Result,
};

use crate::ports::StoragePort;

pub const KEY_CONVERSATIONS: &str = "conversations";
pub const KEY_MESSAGES: &str = "messages";
pub const KEY_SELECTED_MODEL: &str = "selectedModel";
pub const KEY_API_KEY: &str = "apiKey";
pub const KEY_SYSTEM_PROMPT: &str = "systemPrompt";

#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    current_id: u64,
    last_message_id: i64,
}

impl ConversationStore {
    /// A fresh store starts with one empty conversation, selected.
    pub fn new() -> Self {
        Self {
            conversations: vec![Conversation::new(1)],
            current_id: 1,
            last_message_id: 0,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn current_id(&self) -> u64 {
        self.current_id
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.get(self.current_id)
    }

    pub fn get(&self, id: u64) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub fn select(&mut self, id: u64) -> bool {
        if self.get(id).is_some() {
            self.current_id = id;
            true
        } else {
            false
        }
    }

    /// Allocate the next conversation id: one past the current maximum.
    /// Ids are never reused while the list is non-empty.
    pub fn create(&mut self) -> u64 {
        let id = self
            .conversations
            .iter()
            .map(|c| c.id)
            .max()
            .map_or(1, |max| max + 1);
        self.conversations.push(Conversation::new(id));
        self.current_id = id;
        id
    }

    /// Delete a conversation. When the current one goes away, selection
    /// moves to the first remaining conversation.
    pub fn delete(&mut self, id: u64) {
        self.conversations.retain(|c| c.id != id);
        if self.current_id == id {
            if let Some(first) = self.conversations.first() {
                self.current_id = first.id;
            }
        }
    }

    pub fn rename(&mut self, id: u64, title: impl Into<String>) {
        if let Some(conversation) = self.get_mut(id) {
            conversation.title = title.into();
        }
    }

    pub fn in_flight(&self, id: u64) -> bool {
        self.get(id).is_some_and(|c| c.is_in_flight())
    }

    /// Time-derived message ids, bumped to stay strictly monotonic when two
    /// messages land in the same millisecond.
    fn next_message_id(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let id = now.max(self.last_message_id + 1);
        self.last_message_id = id;
        id
    }

    pub fn push_user(&mut self, conversation_id: u64, text: &str) -> Option<i64> {
        let id = self.next_message_id();
        let conversation = self.get_mut(conversation_id)?;
        conversation.messages.push(Message::user(id, text));
        Some(id)
    }

    /// Append the empty assistant placeholder and mark it in-flight.
    /// Returns `None` when a stream is already active for the conversation.
    pub fn begin_assistant(&mut self, conversation_id: u64) -> Option<i64> {
        if self.in_flight(conversation_id) {
            return None;
        }
        let id = self.next_message_id();
        let conversation = self.get_mut(conversation_id)?;
        conversation.messages.push(Message::assistant_placeholder(id));
        conversation.in_flight = Some(id);
        Some(id)
    }

    /// Append a fragment to the in-flight message. A no-op when no stream
    /// is active.
    pub fn append_delta(&mut self, conversation_id: u64, fragment: &str) {
        if let Some(conversation) = self.get_mut(conversation_id) {
            if let Some(message_id) = conversation.in_flight {
                if let Some(message) = conversation
                    .messages
                    .iter_mut()
                    .find(|m| m.id == message_id)
                {
                    message.content.push_str(fragment);
                }
            }
        }
    }

    /// Finalize the in-flight message; it is immutable from here on.
    pub fn finish_stream(&mut self, conversation_id: u64) {
        if let Some(conversation) = self.get_mut(conversation_id) {
            conversation.in_flight = None;
        }
    }

    /// Substitute the fixed error text into the in-flight message and
    /// finalize it.
    pub fn fail_stream(&mut self, conversation_id: u64, error_text: &str) {
        if let Some(conversation) = self.get_mut(conversation_id) {
            if let Some(message_id) = conversation.in_flight.take() {
                if let Some(message) = conversation
                    .messages
                    .iter_mut()
                    .find(|m| m.id == message_id)
                {
                    message.content = error_text.to_string();
                }
            }
        }
    }

    /// Retry a user message: truncate the sequence to end at that message,
    /// append a fresh placeholder, and return the post-truncation context to
    /// re-issue. `None` when the message is not a user message or a stream
    /// is already in flight.
    pub fn retry(&mut self, conversation_id: u64, message_id: i64) -> Option<Vec<Message>> {
        if self.in_flight(conversation_id) {
            return None;
        }
        let conversation = self.get_mut(conversation_id)?;
        let index = conversation
            .messages
            .iter()
            .position(|m| m.id == message_id && m.role == Role::User)?;
        conversation.messages.truncate(index + 1);
        let context = conversation.messages.clone();
        self.begin_assistant(conversation_id)?;
        Some(context)
    }

    /// Regenerate an assistant message: truncate the sequence to end just
    /// before it, append a fresh placeholder, and return the post-truncation
    /// context. Requires an immediately preceding user message.
    pub fn regenerate(&mut self, conversation_id: u64, message_id: i64) -> Option<Vec<Message>> {
        if self.in_flight(conversation_id) {
            return None;
        }
        let conversation = self.get_mut(conversation_id)?;
        let index = conversation
            .messages
            .iter()
            .position(|m| m.id == message_id && m.role == Role::Assistant)?;
        if index == 0 || conversation.messages[index - 1].role != Role::User {
            return None;
        }
        conversation.messages.truncate(index);
        let context = conversation.messages.clone();
        self.begin_assistant(conversation_id)?;
        Some(context)
    }

    // ─── Persistence boundary ────────────────────────────────

    /// Serialize the persisted shape synchronously, so no store borrow is
    /// ever held across a storage suspension point.
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        let metas: Vec<ConversationMeta> =
            self.conversations.iter().map(ConversationMeta::from).collect();
        let mut histories: BTreeMap<String, &Vec<Message>> = BTreeMap::new();
        for conversation in &self.conversations {
            histories.insert(conversation.id.to_string(), &conversation.messages);
        }
        Ok(StoreSnapshot {
            conversations: serde_json::to_string(&metas)?,
            messages: serde_json::to_string(&histories)?,
        })
    }

    /// Load persisted state. Malformed or missing entries fall back to the
    /// fresh-store default with a logged warning — there is no schema
    /// versioning.
    pub async fn load(storage: &dyn StoragePort) -> ConversationStore {
        let mut store = ConversationStore::new();

        let metas: Vec<ConversationMeta> = match storage.get(KEY_CONVERSATIONS).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(metas) => metas,
                Err(err) => {
                    log::warn!("malformed conversation list, starting fresh: {}", err);
                    return store;
                }
            },
            Ok(None) => return store,
            Err(err) => {
                log::warn!("conversation list unavailable: {}", err);
                return store;
            }
        };
        if metas.is_empty() {
            return store;
        }

        let mut histories: HashMap<String, Vec<Message>> = match storage.get(KEY_MESSAGES).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("malformed message histories, dropping them: {}", err);
                HashMap::new()
            }),
            Ok(None) => HashMap::new(),
            Err(err) => {
                log::warn!("message histories unavailable: {}", err);
                HashMap::new()
            }
        };

        store.conversations = metas
            .into_iter()
            .map(|meta| {
                let messages = histories.remove(&meta.id.to_string()).unwrap_or_default();
                Conversation {
                    id: meta.id,
                    title: meta.title,
                    messages,
                    in_flight: None,
                }
            })
            .collect();
        store.current_id = store.conversations[0].id;
        store.last_message_id = store
            .conversations
            .iter()
            .flat_map(|c| c.messages.iter())
            .map(|m| m.id)
            .max()
            .unwrap_or(0);
        store
    }
}

/// The serialized persisted shape: one value per storage key.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub conversations: String,
    pub messages: String,
}

pub async fn save_snapshot(storage: &dyn StoragePort, snapshot: &StoreSnapshot) -> Result<()> {
    storage.set(KEY_CONVERSATIONS, &snapshot.conversations).await?;
    storage.set(KEY_MESSAGES, &snapshot.messages).await?;
    Ok(())
}

/// Restore settings from their individual keys, falling back per-key.
pub async fn load_config(storage: &dyn StoragePort) -> ChatConfig {
    let mut config = ChatConfig::default();

    if let Ok(Some(label)) = storage.get(KEY_SELECTED_MODEL).await {
        config.model = ModelChoice::from_label(&label);
    }
    if let Ok(Some(api_key)) = storage.get(KEY_API_KEY).await {
        config.api_key = api_key;
    }
    if let Ok(Some(prompt)) = storage.get(KEY_SYSTEM_PROMPT).await {
        if !prompt.is_empty() {
            config.system_prompt = prompt;
        }
    }

    config
}

pub async fn save_config(storage: &dyn StoragePort, config: &ChatConfig) -> Result<()> {
    storage
        .set(KEY_SELECTED_MODEL, config.model.label())
        .await?;
    storage.set(KEY_API_KEY, &config.api_key).await?;
    storage.set(KEY_SYSTEM_PROMPT, &config.system_prompt).await?;
    Ok(())
}

/// Whether a conversation still carries the placeholder title.
pub fn has_default_title(conversation: &Conversation) -> bool {
    conversation.title == DEFAULT_TITLE
}

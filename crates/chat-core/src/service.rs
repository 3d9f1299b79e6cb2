//! Chat service — drives one streamed turn from user input to a finalized
//! assistant message.
//!
//! Single-threaded and cooperative: every suspension point is a network
//! read. The in-flight flag is checked and set inside one synchronous store
//! borrow, so send/retry/regenerate can never race. Store borrows are never
//! held across an await.

use std::cell::RefCell;
use std::rc::Rc;

use futures::StreamExt;

use chat_types::{
    config::ChatConfig,
    event::ChatEvent,
    message::{Message, Role},
    ChatError,
};

use crate::delta;
use crate::event_bus::EventBus;
use crate::ports::{ChatPort, ChatRequest, StoragePort, TtsPort, WireMessage};
use crate::sse::SseDecoder;
use crate::store::{self, ConversationStore, StoreSnapshot};

/// Fixed user-visible text substituted into the in-flight message when the
/// upstream request or stream fails.
pub const STREAM_ERROR_TEXT: &str =
    "Something went wrong while generating a response. Please try again.";

const TITLE_PROMPT: &str = "Suggest a very short title (five words at most) for a conversation \
     that starts with the message below. Reply with the title only.";

#[derive(Clone)]
pub struct ChatService {
    store: Rc<RefCell<ConversationStore>>,
    config: Rc<RefCell<ChatConfig>>,
    bus: EventBus,
}

impl ChatService {
    pub fn new(
        store: Rc<RefCell<ConversationStore>>,
        config: Rc<RefCell<ChatConfig>>,
        bus: EventBus,
    ) -> Self {
        Self { store, config, bus }
    }

    /// Send a user message and stream the reply. A no-op when a stream is
    /// already in flight for the conversation; fails before any network I/O
    /// when the credential is missing.
    pub async fn send_message(
        &self,
        chat: &dyn ChatPort,
        storage: &dyn StoragePort,
        conversation_id: u64,
        text: String,
    ) {
        if !self.require_api_key() {
            return;
        }

        let context = {
            let mut store = self.store.borrow_mut();
            if store.in_flight(conversation_id) {
                return;
            }
            if store.push_user(conversation_id, &text).is_none() {
                return;
            }
            let context = store
                .get(conversation_id)
                .map(|c| c.messages.clone())
                .unwrap_or_default();
            if store.begin_assistant(conversation_id).is_none() {
                return;
            }
            context
        };

        self.bus.emit(ChatEvent::StreamStarted { conversation_id });
        self.persist(storage).await;
        self.run_stream(chat, storage, conversation_id, context).await;
    }

    /// Retry a user message: drop everything after it and stream a new reply.
    pub async fn retry(
        &self,
        chat: &dyn ChatPort,
        storage: &dyn StoragePort,
        conversation_id: u64,
        message_id: i64,
    ) {
        if !self.require_api_key() {
            return;
        }
        let Some(context) = self.store.borrow_mut().retry(conversation_id, message_id) else {
            return;
        };
        self.bus.emit(ChatEvent::StreamStarted { conversation_id });
        self.persist(storage).await;
        self.run_stream(chat, storage, conversation_id, context).await;
    }

    /// Regenerate an assistant message in place of the old one.
    pub async fn regenerate(
        &self,
        chat: &dyn ChatPort,
        storage: &dyn StoragePort,
        conversation_id: u64,
        message_id: i64,
    ) {
        if !self.require_api_key() {
            return;
        }
        let Some(context) = self
            .store
            .borrow_mut()
            .regenerate(conversation_id, message_id)
        else {
            return;
        };
        self.bus.emit(ChatEvent::StreamStarted { conversation_id });
        self.persist(storage).await;
        self.run_stream(chat, storage, conversation_id, context).await;
    }

    /// Read the text aloud. Failures are logged and swallowed — the adapter
    /// already fell back to on-device synthesis before reporting an error.
    pub async fn speak(&self, tts: &dyn TtsPort, text: String) {
        if let Err(err) = tts.speak(&text).await {
            log::warn!("speech unavailable: {}", err);
        }
    }

    async fn run_stream(
        &self,
        chat: &dyn ChatPort,
        storage: &dyn StoragePort,
        conversation_id: u64,
        context: Vec<Message>,
    ) {
        let req = self.build_request(&context, true);

        let mut stream = match chat.stream_chat(&req).await {
            Ok(stream) => stream,
            Err(err) => {
                self.fail(storage, conversation_id, err).await;
                return;
            }
        };

        let mut decoder = SseDecoder::new();
        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(err) => {
                    self.fail(storage, conversation_id, err).await;
                    return;
                }
            };

            for event in decoder.push(&bytes) {
                match delta::delta_content(&event.payload) {
                    Ok(Some(fragment)) => {
                        self.store
                            .borrow_mut()
                            .append_delta(conversation_id, &fragment);
                        self.bus.emit(ChatEvent::StreamDelta {
                            conversation_id,
                            fragment,
                        });
                    }
                    Ok(None) => {}
                    Err(err) => {
                        log::warn!("skipping malformed stream chunk: {}", err);
                    }
                }
            }

            if decoder.finished() {
                break;
            }
        }

        self.store.borrow_mut().finish_stream(conversation_id);
        self.bus.emit(ChatEvent::StreamFinished { conversation_id });
        self.persist(storage).await;

        self.maybe_generate_title(chat, storage, conversation_id).await;
    }

    /// After the first completed exchange, ask for a short title once.
    async fn maybe_generate_title(
        &self,
        chat: &dyn ChatPort,
        storage: &dyn StoragePort,
        conversation_id: u64,
    ) {
        let first_user = {
            let store = self.store.borrow();
            let Some(conversation) = store.get(conversation_id) else {
                return;
            };
            if !store::has_default_title(conversation) || conversation.is_in_flight() {
                return;
            }
            let Some(first_user) = conversation
                .messages
                .iter()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone())
            else {
                return;
            };
            first_user
        };

        let req = {
            let config = self.config.borrow();
            ChatRequest {
                model: config.model.model_id().to_string(),
                messages: vec![WireMessage::system(TITLE_PROMPT), WireMessage {
                    role: "user",
                    content: first_user,
                }],
                stream: false,
                api_key: config.api_key.clone(),
            }
        };

        match chat.complete(&req).await {
            Ok(raw) => {
                let title = raw.trim().trim_matches('"').to_string();
                if title.is_empty() {
                    return;
                }
                self.store.borrow_mut().rename(conversation_id, &title);
                self.bus.emit(ChatEvent::TitleChanged {
                    conversation_id,
                    title,
                });
                self.persist(storage).await;
            }
            Err(err) => log::warn!("title generation failed: {}", err),
        }
    }

    fn build_request(&self, context: &[Message], stream: bool) -> ChatRequest {
        let config = self.config.borrow();
        let mut messages = vec![WireMessage::system(config.system_prompt.clone())];
        messages.extend(context.iter().map(WireMessage::from));
        ChatRequest {
            model: config.model.model_id().to_string(),
            messages,
            stream,
            api_key: config.api_key.clone(),
        }
    }

    /// Surface a missing credential before any network I/O.
    fn require_api_key(&self) -> bool {
        if self.config.borrow().api_key.is_empty() {
            self.bus.emit(ChatEvent::Error {
                message: ChatError::MissingApiKey.to_string(),
            });
            return false;
        }
        true
    }

    async fn fail(&self, storage: &dyn StoragePort, conversation_id: u64, err: ChatError) {
        log::error!("stream failed: {}", err);
        self.store
            .borrow_mut()
            .fail_stream(conversation_id, STREAM_ERROR_TEXT);
        self.bus.emit(ChatEvent::StreamFailed {
            conversation_id,
            message: err.to_string(),
        });
        self.persist(storage).await;
    }

    /// Save-on-mutation: snapshot synchronously, then write both keys.
    async fn persist(&self, storage: &dyn StoragePort) {
        let snapshot: Option<StoreSnapshot> = match self.store.borrow().snapshot() {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                log::warn!("failed to serialize conversations: {}", err);
                None
            }
        };
        if let Some(snapshot) = snapshot {
            if let Err(err) = store::save_snapshot(storage, &snapshot).await {
                log::warn!("failed to persist conversations: {}", err);
            }
        }
    }
}

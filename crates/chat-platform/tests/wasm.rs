//! WASM-target tests for chat-platform (Node.js runtime).
//!
//! Tests MemoryStorage and the persistence boundary on top of it under
//! wasm32-unknown-unknown via `wasm-pack test --node`.
//!
//! localStorage, fetch streaming, and audio playback require a browser and
//! are exercised manually.

use wasm_bindgen_test::*;

use chat_core::ports::StoragePort;
use chat_core::store::{self, ConversationStore};
use chat_platform::storage::MemoryStorage;
use chat_types::config::{ChatConfig, ModelChoice};

// ─── MemoryStorage Tests ─────────────────────────────────

#[wasm_bindgen_test]
fn memory_storage_backend_name() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
async fn memory_storage_get_missing() {
    let storage = MemoryStorage::new();
    let result = storage.get("nonexistent").await.unwrap();
    assert!(result.is_none());
}

#[wasm_bindgen_test]
async fn memory_storage_set_and_get() {
    let storage = MemoryStorage::new();
    storage.set("key1", "value1").await.unwrap();
    let result = storage.get("key1").await.unwrap();
    assert_eq!(result.as_deref(), Some("value1"));
}

#[wasm_bindgen_test]
async fn memory_storage_overwrite() {
    let storage = MemoryStorage::new();
    storage.set("key", "v1").await.unwrap();
    storage.set("key", "v2").await.unwrap();
    let result = storage.get("key").await.unwrap();
    assert_eq!(result.as_deref(), Some("v2"));
}

#[wasm_bindgen_test]
async fn memory_storage_delete() {
    let storage = MemoryStorage::new();
    storage.set("key", "val").await.unwrap();
    storage.delete("key").await.unwrap();
    assert!(storage.get("key").await.unwrap().is_none());
}

#[wasm_bindgen_test]
async fn memory_storage_delete_nonexistent() {
    let storage = MemoryStorage::new();
    storage.delete("nonexistent").await.unwrap();
}

#[wasm_bindgen_test]
async fn memory_storage_empty_value() {
    let storage = MemoryStorage::new();
    storage.set("empty", "").await.unwrap();
    let result = storage.get("empty").await.unwrap().unwrap();
    assert!(result.is_empty());
}

#[wasm_bindgen_test]
async fn memory_storage_unicode_value() {
    let storage = MemoryStorage::new();
    let text = "你好世界 🌍 こんにちは";
    storage.set("unicode", text).await.unwrap();
    assert_eq!(storage.get("unicode").await.unwrap().unwrap(), text);
}

// ─── Persistence boundary on MemoryStorage ───────────────

#[wasm_bindgen_test]
async fn store_roundtrip_through_memory_storage() {
    let storage = MemoryStorage::new();

    let mut original = ConversationStore::new();
    original.push_user(1, "hello").unwrap();
    original.begin_assistant(1).unwrap();
    original.append_delta(1, "world");
    original.finish_stream(1);

    let snapshot = original.snapshot().unwrap();
    store::save_snapshot(&storage, &snapshot).await.unwrap();

    let restored = ConversationStore::load(&storage).await;
    let conversation = restored.get(1).unwrap();
    assert_eq!(conversation.messages.len(), 2);
    assert_eq!(conversation.messages[1].content, "world");
}

#[wasm_bindgen_test]
async fn config_roundtrip_through_memory_storage() {
    let storage = MemoryStorage::new();

    let mut config = ChatConfig::default();
    config.model = ModelChoice::Grok;
    config.api_key = "sk-wasm".to_string();
    store::save_config(&storage, &config).await.unwrap();

    let restored = store::load_config(&storage).await;
    assert_eq!(restored.model, ModelChoice::Grok);
    assert_eq!(restored.api_key, "sk-wasm");
}

#[wasm_bindgen_test]
async fn load_with_empty_storage_yields_fresh_store() {
    let storage = MemoryStorage::new();
    let store = ConversationStore::load(&storage).await;
    assert_eq!(store.conversations().len(), 1);
    assert_eq!(store.current_id(), 1);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use async_trait::async_trait;
    use futures::executor::block_on;

    use chat_types::config::ChatConfig;
    use chat_types::conversation::DEFAULT_TITLE;
    use chat_types::event::ChatEvent;
    use chat_types::message::Role;
    use chat_types::{ChatError, Result};

    use crate::delta::{delta_content, message_content};
    use crate::event_bus::EventBus;
    use crate::markdown::{render, THINKING_PLACEHOLDER};
    use crate::ports::*;
    use crate::service::{ChatService, STREAM_ERROR_TEXT};
    use crate::sse::SseDecoder;
    use crate::store::{self, ConversationStore};

    // ─── SSE Decoder Tests ───────────────────────────────────

    const FIXTURE: &[u8] = b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\
        data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\
        data: [DONE]\n";

    fn decode_all(chunks: &[&[u8]]) -> Vec<String> {
        let mut decoder = SseDecoder::new();
        let mut payloads = Vec::new();
        for chunk in chunks {
            for event in decoder.push(chunk) {
                payloads.push(event.payload);
            }
        }
        payloads
    }

    #[test]
    fn test_decoder_single_chunk() {
        let payloads = decode_all(&[FIXTURE]);
        assert_eq!(payloads.len(), 2);
        assert!(payloads[0].contains("Hi"));
        assert!(payloads[1].contains(" there"));
    }

    #[test]
    fn test_decoder_split_invariance() {
        // The decoded sequence must be identical for every split point,
        // including splits in the middle of a line.
        let whole = decode_all(&[FIXTURE]);
        for i in 0..FIXTURE.len() {
            let split = decode_all(&[&FIXTURE[..i], &FIXTURE[i..]]);
            assert_eq!(split, whole, "split at byte {} diverged", i);
        }
    }

    #[test]
    fn test_decoder_byte_at_a_time() {
        let chunks: Vec<&[u8]> = FIXTURE.chunks(1).collect();
        assert_eq!(decode_all(&chunks), decode_all(&[FIXTURE]));
    }

    #[test]
    fn test_decoder_terminator_not_yielded() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: [DONE]\n");
        assert!(events.is_empty());
        assert!(decoder.finished());
    }

    #[test]
    fn test_decoder_stops_after_terminator() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: [DONE]\ndata: {\"late\":true}\n");
        assert!(events.is_empty());
        let events = decoder.push(b"data: {\"later\":true}\n");
        assert!(events.is_empty());
    }

    #[test]
    fn test_decoder_crlf_lines() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: {\"a\":1}\r\ndata: [DONE]\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload, "{\"a\":1}");
        assert!(decoder.finished());
    }

    #[test]
    fn test_decoder_crlf_split_between_cr_and_lf() {
        let input = b"data: {\"a\":1}\r\n";
        let whole = decode_all(&[&input[..]]);
        let split = decode_all(&[&input[..14], &input[14..]]);
        assert_eq!(whole, split);
    }

    #[test]
    fn test_decoder_ignores_non_data_lines() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: ping\n: comment\n\ndata: {\"a\":1}\n");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_decoder_holds_back_partial_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        let events = decoder.push(b":1}\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload, "{\"a\":1}");
    }

    #[test]
    fn test_decoder_utf8_split_mid_codepoint() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo\"}}]}\n";
        let bytes = line.as_bytes();
        let whole = decode_all(&[bytes]);
        for i in 0..bytes.len() {
            let split = decode_all(&[&bytes[..i], &bytes[i..]]);
            assert_eq!(split, whole, "split at byte {} diverged", i);
        }
        assert!(whole[0].contains("héllo"));
    }

    #[test]
    fn test_decoder_malformed_payload_still_yielded() {
        // The decoder is line-oriented; JSON validation happens downstream.
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: {not json\ndata: {\"a\":1}\n");
        assert_eq!(events.len(), 2);
    }

    // ─── Delta Extraction Tests ──────────────────────────────

    #[test]
    fn test_delta_content_present() {
        let payload = r#"{"choices":[{"delta":{"content":"Hi"}}]}"#;
        assert_eq!(delta_content(payload).unwrap(), Some("Hi".to_string()));
    }

    #[test]
    fn test_delta_content_role_only_is_none() {
        let payload = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(delta_content(payload).unwrap(), None);
    }

    #[test]
    fn test_delta_content_empty_is_none() {
        let payload = r#"{"choices":[{"delta":{"content":""}}]}"#;
        assert_eq!(delta_content(payload).unwrap(), None);
    }

    #[test]
    fn test_delta_content_no_choices() {
        assert_eq!(delta_content(r#"{"choices":[]}"#).unwrap(), None);
        assert_eq!(delta_content(r#"{}"#).unwrap(), None);
    }

    #[test]
    fn test_delta_content_malformed_is_err() {
        assert!(delta_content("{not json").is_err());
    }

    #[test]
    fn test_message_content_extraction() {
        let payload = r#"{"choices":[{"message":{"role":"assistant","content":"A Title"}}]}"#;
        assert_eq!(
            message_content(payload).unwrap(),
            Some("A Title".to_string())
        );
        assert_eq!(message_content(r#"{"choices":[]}"#).unwrap(), None);
    }

    // ─── Markdown Renderer Tests ─────────────────────────────

    #[test]
    fn test_markdown_empty_passthrough() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_markdown_thinking_passthrough() {
        assert_eq!(render(THINKING_PLACEHOLDER), THINKING_PLACEHOLDER);
        // Not a prefix match — real content renders normally.
        assert_eq!(render("Thinking... done"), "<p>Thinking... done</p>");
    }

    #[test]
    fn test_markdown_plain_paragraph() {
        assert_eq!(render("Hello world"), "<p>Hello world</p>");
    }

    #[test]
    fn test_markdown_bold_and_italic() {
        let html = render("**bold** and *em*");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>em</em>"));
        assert!(!html.contains('*'));
    }

    #[test]
    fn test_markdown_escapes_html() {
        let html = render("<script>alert(1)</script>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_markdown_escapes_ampersand() {
        assert_eq!(render("a & b"), "<p>a &amp; b</p>");
    }

    #[test]
    fn test_markdown_link() {
        let html = render("see [docs](https://example.com) now");
        assert!(html.contains(
            "<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">docs</a>"
        ));
    }

    #[test]
    fn test_markdown_fenced_code_block() {
        let html = render("```\nlet x = 1 < 2;\n```");
        assert_eq!(html, "<pre><code>let x = 1 &lt; 2;</code></pre>");
    }

    #[test]
    fn test_markdown_emphasis_not_applied_inside_code() {
        let html = render("```\n**not bold**\n```");
        assert!(html.contains("**not bold**"));
        assert!(!html.contains("<strong>"));
    }

    #[test]
    fn test_markdown_inline_code() {
        let html = render("use `foo()` here");
        assert_eq!(html, "<p>use <code>foo()</code> here</p>");
    }

    #[test]
    fn test_markdown_headings() {
        assert_eq!(render("# One"), "<h1>One</h1>");
        assert_eq!(render("## Two"), "<h2>Two</h2>");
        assert_eq!(render("### Three"), "<h3>Three</h3>");
    }

    #[test]
    fn test_markdown_heading_not_wrapped_in_paragraph() {
        let html = render("# Title\n\nbody text");
        assert_eq!(html, "<h1>Title</h1><p>body text</p>");
    }

    #[test]
    fn test_markdown_unordered_list_single_run() {
        let html = render("- one\n- two\n- three");
        assert_eq!(html, "<ul><li>one</li><li>two</li><li>three</li></ul>");
    }

    #[test]
    fn test_markdown_star_bullets() {
        let html = render("* one\n* two");
        assert_eq!(html, "<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn test_markdown_ordered_list_single_run() {
        let html = render("1. first\n2. second\n10. tenth");
        assert_eq!(
            html,
            "<ol><li>first</li><li>second</li><li>tenth</li></ol>"
        );
    }

    #[test]
    fn test_markdown_adjacent_runs_close_between() {
        // Both list tags close exactly once; the paragraph stays because the
        // segment does not solely contain a single list.
        let html = render("1. a\n- b");
        assert_eq!(html, "<p><ol><li>a</li></ol><ul><li>b</li></ul></p>");
    }

    #[test]
    fn test_markdown_paragraph_lines_space_joined() {
        assert_eq!(render("line one\nline two"), "<p>line one line two</p>");
    }

    #[test]
    fn test_markdown_blank_line_splits_paragraphs() {
        assert_eq!(render("one\n\ntwo"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_markdown_strips_empty_paragraphs() {
        let html = render("one\n\n\n\ntwo");
        assert_eq!(html, "<p>one</p><p>two</p>");
    }

    // ─── Conversation Store Tests ────────────────────────────

    #[test]
    fn test_store_starts_with_one_conversation() {
        let store = ConversationStore::new();
        assert_eq!(store.conversations().len(), 1);
        assert_eq!(store.current_id(), 1);
        assert_eq!(store.current().unwrap().title, DEFAULT_TITLE);
    }

    #[test]
    fn test_store_create_allocates_past_max() {
        let mut store = ConversationStore::new();
        assert_eq!(store.create(), 2);
        assert_eq!(store.create(), 3);
        store.delete(2);
        // 2 is never reused while the list is non-empty
        assert_eq!(store.create(), 4);
    }

    #[test]
    fn test_store_ids_restart_when_empty() {
        let mut store = ConversationStore::new();
        store.delete(1);
        assert!(store.conversations().is_empty());
        assert_eq!(store.create(), 1);
    }

    #[test]
    fn test_store_delete_reselects_first_remaining() {
        let mut store = ConversationStore::new();
        let second = store.create();
        assert_eq!(store.current_id(), second);
        store.delete(second);
        assert_eq!(store.current_id(), 1);
    }

    #[test]
    fn test_store_rename_and_select() {
        let mut store = ConversationStore::new();
        let second = store.create();
        store.rename(second, "Weather");
        assert!(store.select(1));
        assert!(!store.select(999));
        assert_eq!(store.get(second).unwrap().title, "Weather");
    }

    #[test]
    fn test_store_message_ids_monotonic() {
        let mut store = ConversationStore::new();
        let a = store.push_user(1, "one").unwrap();
        let b = store.push_user(1, "two").unwrap();
        let c = store.begin_assistant(1).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_store_single_in_flight() {
        let mut store = ConversationStore::new();
        assert!(store.begin_assistant(1).is_some());
        assert!(store.begin_assistant(1).is_none());
        store.finish_stream(1);
        assert!(store.begin_assistant(1).is_some());
    }

    #[test]
    fn test_store_append_delta_only_while_in_flight() {
        let mut store = ConversationStore::new();
        let id = store.begin_assistant(1).unwrap();
        store.append_delta(1, "Hi");
        store.append_delta(1, " there");
        store.finish_stream(1);
        store.append_delta(1, " ignored");
        let conversation = store.get(1).unwrap();
        let message = conversation.messages.iter().find(|m| m.id == id).unwrap();
        assert_eq!(message.content, "Hi there");
    }

    #[test]
    fn test_store_fail_stream_substitutes_error_text() {
        let mut store = ConversationStore::new();
        let id = store.begin_assistant(1).unwrap();
        store.append_delta(1, "partial");
        store.fail_stream(1, STREAM_ERROR_TEXT);
        let conversation = store.get(1).unwrap();
        assert!(!conversation.is_in_flight());
        let message = conversation.messages.iter().find(|m| m.id == id).unwrap();
        assert_eq!(message.content, STREAM_ERROR_TEXT);
    }

    #[test]
    fn test_store_retry_truncates_to_user_message() {
        let mut store = ConversationStore::new();
        let u1 = store.push_user(1, "first").unwrap();
        let a1 = store.begin_assistant(1).unwrap();
        store.append_delta(1, "reply one");
        store.finish_stream(1);
        store.push_user(1, "second").unwrap();
        let a2 = store.begin_assistant(1).unwrap();
        store.finish_stream(1);

        // retry on the user message at index 0 → truncate to length 1, then
        // append the new placeholder
        let context = store.retry(1, u1).unwrap();
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].id, u1);

        let conversation = store.get(1).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].id, u1);
        assert_eq!(conversation.messages[1].role, Role::Assistant);
        assert!(conversation.messages[1].content.is_empty());
        assert!(!conversation.messages.iter().any(|m| m.id == a1));
        assert!(!conversation.messages.iter().any(|m| m.id == a2));
    }

    #[test]
    fn test_store_regenerate_truncates_before_assistant() {
        let mut store = ConversationStore::new();
        store.push_user(1, "first").unwrap();
        let a1 = store.begin_assistant(1).unwrap();
        store.append_delta(1, "old reply");
        store.finish_stream(1);

        // regenerate on the assistant message at index 1 → truncate to
        // length 1, then append the new placeholder
        let context = store.regenerate(1, a1).unwrap();
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].role, Role::User);

        let conversation = store.get(1).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].role, Role::Assistant);
        assert!(conversation.messages[1].content.is_empty());
    }

    #[test]
    fn test_store_retry_rejected_while_in_flight() {
        let mut store = ConversationStore::new();
        let u1 = store.push_user(1, "first").unwrap();
        let a1 = store.begin_assistant(1).unwrap();
        assert!(store.retry(1, u1).is_none());
        assert!(store.regenerate(1, a1).is_none());
        assert_eq!(store.get(1).unwrap().messages.len(), 2);
    }

    #[test]
    fn test_store_retry_requires_user_message() {
        let mut store = ConversationStore::new();
        store.push_user(1, "q").unwrap();
        let a1 = store.begin_assistant(1).unwrap();
        store.finish_stream(1);
        assert!(store.retry(1, a1).is_none());
    }

    #[test]
    fn test_store_regenerate_requires_preceding_user() {
        let mut store = ConversationStore::new();
        let a1 = store.begin_assistant(1).unwrap();
        store.finish_stream(1);
        assert!(store.regenerate(1, a1).is_none());
    }

    // ─── Event Bus Tests ─────────────────────────────────────

    #[test]
    fn test_event_bus_emit_and_drain() {
        let bus = EventBus::new();
        assert!(!bus.has_pending());
        bus.emit(ChatEvent::StreamStarted { conversation_id: 1 });
        bus.emit(ChatEvent::StreamFinished { conversation_id: 1 });
        assert!(bus.has_pending());
        assert_eq!(bus.drain().len(), 2);
        assert!(!bus.has_pending());
    }

    #[test]
    fn test_event_bus_clone_shares_state() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();
        bus1.emit(ChatEvent::StreamStarted { conversation_id: 1 });
        assert!(bus2.has_pending());
        assert_eq!(bus2.drain().len(), 1);
        assert!(!bus1.has_pending());
    }

    // ─── Mock Ports ──────────────────────────────────────────

    struct MockStorage {
        data: RefCell<HashMap<String, String>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                data: RefCell::new(HashMap::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl StoragePort for MockStorage {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.data.borrow().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.data
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.data.borrow_mut().remove(key);
            Ok(())
        }

        fn backend_name(&self) -> &str {
            "mock"
        }
    }

    /// Scripted chat port: replays fixed byte chunks, records the last
    /// streamed request, and answers completions with a fixed title.
    struct MockChat {
        chunks: Vec<Vec<u8>>,
        last_request: RefCell<Option<ChatRequest>>,
        title: String,
    }

    impl MockChat {
        fn new(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                chunks,
                last_request: RefCell::new(None),
                title: "Mock Title".to_string(),
            }
        }
    }

    #[async_trait(?Send)]
    impl ChatPort for MockChat {
        async fn stream_chat(&self, req: &ChatRequest) -> Result<ByteStream> {
            *self.last_request.borrow_mut() = Some(req.clone());
            let chunks = self.chunks.clone();
            Ok(Box::pin(futures::stream::iter(
                chunks.into_iter().map(Ok::<_, ChatError>),
            )))
        }

        async fn complete(&self, _req: &ChatRequest) -> Result<String> {
            Ok(self.title.clone())
        }
    }

    struct FailingChat;

    #[async_trait(?Send)]
    impl ChatPort for FailingChat {
        async fn stream_chat(&self, _req: &ChatRequest) -> Result<ByteStream> {
            Err(ChatError::Upstream {
                status: 502,
                body: "bad gateway".to_string(),
            })
        }

        async fn complete(&self, _req: &ChatRequest) -> Result<String> {
            Err(ChatError::Network("unreachable".to_string()))
        }
    }

    fn service_fixture() -> (
        ChatService,
        Rc<RefCell<ConversationStore>>,
        Rc<RefCell<ChatConfig>>,
        EventBus,
    ) {
        let store = Rc::new(RefCell::new(ConversationStore::new()));
        let mut config = ChatConfig::default();
        config.api_key = "sk-test".to_string();
        let config = Rc::new(RefCell::new(config));
        let bus = EventBus::new();
        let service = ChatService::new(store.clone(), config.clone(), bus.clone());
        (service, store, config, bus)
    }

    // ─── Chat Service Tests ──────────────────────────────────

    #[test]
    fn test_service_aggregates_stream() {
        let (service, store, _config, bus) = service_fixture();
        let storage = MockStorage::new();
        let chat = MockChat::new(vec![FIXTURE.to_vec()]);

        block_on(service.send_message(&chat, &storage, 1, "hello".to_string()));

        let store = store.borrow();
        let conversation = store.get(1).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].content, "hello");
        assert_eq!(conversation.messages[1].content, "Hi there");
        assert!(!conversation.is_in_flight());

        let events = bus.drain();
        assert!(events
            .iter()
            .any(|e| matches!(e, ChatEvent::StreamStarted { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, ChatEvent::StreamFinished { .. })));
    }

    #[test]
    fn test_service_request_shape() {
        let (service, _store, config, _bus) = service_fixture();
        let storage = MockStorage::new();
        let chat = MockChat::new(vec![FIXTURE.to_vec()]);

        block_on(service.send_message(&chat, &storage, 1, "hello".to_string()));

        let req = chat.last_request.borrow().clone().unwrap();
        assert!(req.stream);
        assert_eq!(req.api_key, "sk-test");
        assert_eq!(req.model, config.borrow().model.model_id());
        // system prompt first, then the user message
        assert_eq!(req.messages[0].role, "system");
        assert_eq!(req.messages.last().unwrap().role, "user");
        assert_eq!(req.messages.last().unwrap().content, "hello");
    }

    #[test]
    fn test_service_malformed_chunk_recovered() {
        let (service, store, _config, _bus) = service_fixture();
        let storage = MockStorage::new();
        let chat = MockChat::new(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n".to_vec(),
            b"data: {not json\n".to_vec(),
            b"data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n".to_vec(),
            b"data: [DONE]\n".to_vec(),
        ]);

        block_on(service.send_message(&chat, &storage, 1, "q".to_string()));

        let store = store.borrow();
        assert_eq!(store.get(1).unwrap().messages[1].content, "Hi there");
    }

    #[test]
    fn test_service_missing_api_key_blocks_before_network() {
        let (service, store, config, bus) = service_fixture();
        config.borrow_mut().api_key.clear();
        let storage = MockStorage::new();
        let chat = MockChat::new(vec![]);

        block_on(service.send_message(&chat, &storage, 1, "hello".to_string()));

        assert!(chat.last_request.borrow().is_none());
        assert!(store.borrow().get(1).unwrap().messages.is_empty());
        let events = bus.drain();
        assert!(events
            .iter()
            .any(|e| matches!(e, ChatEvent::Error { message } if message.contains("API key"))));
    }

    #[test]
    fn test_service_upstream_error_substitutes_text() {
        let (service, store, _config, bus) = service_fixture();
        let storage = MockStorage::new();

        block_on(service.send_message(&FailingChat, &storage, 1, "hello".to_string()));

        let store = store.borrow();
        let conversation = store.get(1).unwrap();
        assert_eq!(conversation.messages[1].content, STREAM_ERROR_TEXT);
        assert!(!conversation.is_in_flight());
        assert!(bus
            .drain()
            .iter()
            .any(|e| matches!(e, ChatEvent::StreamFailed { .. })));
    }

    #[test]
    fn test_service_generates_title_after_first_exchange() {
        let (service, store, _config, _bus) = service_fixture();
        let storage = MockStorage::new();
        let chat = MockChat::new(vec![FIXTURE.to_vec()]);

        block_on(service.send_message(&chat, &storage, 1, "hello".to_string()));

        assert_eq!(store.borrow().get(1).unwrap().title, "Mock Title");
    }

    #[test]
    fn test_service_send_rejected_while_in_flight() {
        let (service, store, _config, _bus) = service_fixture();
        let storage = MockStorage::new();
        let chat = MockChat::new(vec![FIXTURE.to_vec()]);

        store.borrow_mut().begin_assistant(1).unwrap();
        block_on(service.send_message(&chat, &storage, 1, "hello".to_string()));

        // only the stuck placeholder; the send was a no-op
        assert_eq!(store.borrow().get(1).unwrap().messages.len(), 1);
        assert!(chat.last_request.borrow().is_none());
    }

    #[test]
    fn test_service_persists_after_stream() {
        let (service, _store, _config, _bus) = service_fixture();
        let storage = MockStorage::new();
        let chat = MockChat::new(vec![FIXTURE.to_vec()]);

        block_on(service.send_message(&chat, &storage, 1, "hello".to_string()));

        let saved = storage.data.borrow();
        let messages = saved.get(store::KEY_MESSAGES).unwrap();
        assert!(messages.contains("Hi there"));
        let conversations = saved.get(store::KEY_CONVERSATIONS).unwrap();
        assert!(conversations.contains("Mock Title"));
    }

    // ─── Persistence Tests ───────────────────────────────────

    #[test]
    fn test_store_snapshot_roundtrip() {
        let storage = MockStorage::new();
        let mut original = ConversationStore::new();
        original.push_user(1, "hello").unwrap();
        original.begin_assistant(1).unwrap();
        original.append_delta(1, "world");
        original.finish_stream(1);
        original.rename(1, "Greetings");
        let second = original.create();
        original.push_user(second, "other").unwrap();

        let snapshot = original.snapshot().unwrap();
        block_on(store::save_snapshot(&storage, &snapshot)).unwrap();
        let restored = block_on(ConversationStore::load(&storage));

        assert_eq!(restored.conversations().len(), 2);
        let first = restored.get(1).unwrap();
        assert_eq!(first.title, "Greetings");
        assert_eq!(first.messages.len(), 2);
        assert_eq!(first.messages[1].content, "world");
        assert!(!first.is_in_flight());
        assert_eq!(restored.get(second).unwrap().messages.len(), 1);
    }

    #[test]
    fn test_store_load_malformed_falls_back() {
        let storage = MockStorage::new();
        block_on(storage.set(store::KEY_CONVERSATIONS, "{definitely not json")).unwrap();
        let restored = block_on(ConversationStore::load(&storage));
        assert_eq!(restored.conversations().len(), 1);
        assert_eq!(restored.current_id(), 1);
    }

    #[test]
    fn test_config_roundtrip() {
        let storage = MockStorage::new();
        let mut config = ChatConfig::default();
        config.model = chat_types::config::ModelChoice::Kimi;
        config.api_key = "sk-live".to_string();
        config.system_prompt = "Be terse.".to_string();

        block_on(store::save_config(&storage, &config)).unwrap();
        let restored = block_on(store::load_config(&storage));

        assert_eq!(restored.model, chat_types::config::ModelChoice::Kimi);
        assert_eq!(restored.api_key, "sk-live");
        assert_eq!(restored.system_prompt, "Be terse.");
    }

    #[test]
    fn test_config_load_defaults_when_missing() {
        let storage = MockStorage::new();
        let restored = block_on(store::load_config(&storage));
        assert_eq!(restored.model, chat_types::config::ModelChoice::Gemini);
        assert!(restored.api_key.is_empty());
    }
}

//! Main egui application — composes all panels and drives the chat service.

use std::cell::RefCell;
use std::rc::Rc;

use egui::{self, CentralPanel, ComboBox, RichText, SidePanel, TopBottomPanel};

use chat_core::event_bus::EventBus;
use chat_core::ports::{ChatPort, StoragePort, TtsPort};
use chat_core::service::ChatService;
use chat_core::store::{self, ConversationStore};
use chat_platform::llm::ProxyChatTransport;
use chat_platform::storage::auto_detect_storage;
use chat_platform::tts::SpeakerAdapter;
use chat_types::config::{ChatConfig, ModelChoice};
use chat_ui::panels::{chat, settings, sidebar};
use chat_ui::state::UiState;
use chat_ui::theme;

type RestoredState = Rc<RefCell<Option<(ConversationStore, ChatConfig)>>>;

/// The main application state
pub struct ChatApp {
    ui_state: UiState,
    store: Rc<RefCell<ConversationStore>>,
    config: Rc<RefCell<ChatConfig>>,
    bus: EventBus,
    service: ChatService,
    chat: Rc<dyn ChatPort>,
    tts: Rc<dyn TtsPort>,
    storage: Rc<dyn StoragePort>,
    restored: RestoredState,
    first_frame: bool,
}

impl ChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let bus = EventBus::new();
        let store = Rc::new(RefCell::new(ConversationStore::new()));
        let config = Rc::new(RefCell::new(ChatConfig::default()));
        let service = ChatService::new(store.clone(), config.clone(), bus.clone());

        let storage = auto_detect_storage();
        let chat: Rc<dyn ChatPort> = Rc::new(ProxyChatTransport::new(""));
        let tts: Rc<dyn TtsPort> =
            Rc::new(SpeakerAdapter::new("", config.borrow().tts.clone()));

        let restored: RestoredState = Rc::new(RefCell::new(None));
        Self::restore_state(storage.clone(), restored.clone());

        Self {
            ui_state: UiState::new(),
            store,
            config,
            bus,
            service,
            chat,
            tts,
            storage,
            restored,
            first_frame: true,
        }
    }

    /// Load persisted conversations and settings (async); the next frame
    /// picks the result up from the shared slot.
    fn restore_state(storage: Rc<dyn StoragePort>, slot: RestoredState) {
        wasm_bindgen_futures::spawn_local(async move {
            let store = ConversationStore::load(storage.as_ref()).await;
            let config = store::load_config(storage.as_ref()).await;
            *slot.borrow_mut() = Some((store, config));
            log::info!("State restored from {}", storage.backend_name());
        });
    }

    fn rebuild_adapters(&mut self) {
        let config = self.config.borrow();
        self.chat = Rc::new(ProxyChatTransport::new(config.proxy_base.clone()));
        self.tts = Rc::new(SpeakerAdapter::new(
            config.proxy_base.clone(),
            config.tts.clone(),
        ));
    }

    /// Save-on-mutation for sidebar edits: snapshot synchronously, write
    /// in the background.
    fn persist_store(&self) {
        let snapshot = match self.store.borrow().snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("failed to serialize conversations: {}", err);
                return;
            }
        };
        let storage = self.storage.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = store::save_snapshot(storage.as_ref(), &snapshot).await {
                log::warn!("failed to persist conversations: {}", err);
            }
        });
    }

    fn persist_config(&self) {
        let config = self.config.borrow().clone();
        let storage = self.storage.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = store::save_config(storage.as_ref(), &config).await {
                log::warn!("failed to persist settings: {}", err);
            }
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        // Apply async-restored state once it arrives
        let loaded = self.restored.borrow_mut().take();
        if let Some((loaded_store, loaded_config)) = loaded {
            *self.store.borrow_mut() = loaded_store;
            *self.config.borrow_mut() = loaded_config;
            self.rebuild_adapters();
            ctx.request_repaint();
        }

        // Drain events from the chat service
        let events = self.bus.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
            ctx.request_repaint();
        }

        if self.ui_state.is_busy() {
            ctx.request_repaint();
        }

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(RichText::new("☰").size(16.0))
                    .on_hover_text("Toggle sidebar")
                    .clicked()
                {
                    self.ui_state.show_sidebar = !self.ui_state.show_sidebar;
                }
                ui.label(
                    RichText::new("Web Chat")
                        .strong()
                        .color(theme::ACCENT)
                        .size(16.0),
                );
                ui.separator();

                // Model picker: a plain options list with a selection callback
                let mut model = self.config.borrow().model;
                let mut model_changed = false;
                ComboBox::from_id_salt("top_bar_model")
                    .selected_text(model.label())
                    .show_ui(ui, |ui| {
                        for choice in ModelChoice::all() {
                            if ui
                                .selectable_value(&mut model, *choice, choice.label())
                                .changed()
                            {
                                model_changed = true;
                            }
                        }
                    });
                if model_changed {
                    self.config.borrow_mut().model = model;
                    self.persist_config();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .selectable_label(self.ui_state.show_settings, "Settings")
                        .clicked()
                    {
                        self.ui_state.show_settings = !self.ui_state.show_settings;
                    }
                });
            });
        });

        // ── Sidebar ──────────────────────────────────────────
        if self.ui_state.show_sidebar {
            let action = SidePanel::left("sidebar_panel")
                .min_width(200.0)
                .max_width(280.0)
                .show(ctx, |ui| {
                    let store = self.store.borrow();
                    sidebar::sidebar_panel(
                        ui,
                        &mut self.ui_state,
                        store.conversations(),
                        store.current_id(),
                    )
                })
                .inner;

            if let Some(action) = action {
                let mut store = self.store.borrow_mut();
                match action {
                    sidebar::SidebarAction::Select(id) => {
                        store.select(id);
                    }
                    sidebar::SidebarAction::Create => {
                        store.create();
                        drop(store);
                        self.persist_store();
                    }
                    sidebar::SidebarAction::Delete(id) => {
                        store.delete(id);
                        drop(store);
                        self.persist_store();
                    }
                    sidebar::SidebarAction::Rename(id, title) => {
                        store.rename(id, title);
                        drop(store);
                        self.persist_store();
                    }
                }
            }
        }

        // ── Settings side panel ──────────────────────────────
        if self.ui_state.show_settings {
            let changed = SidePanel::right("settings_panel")
                .min_width(280.0)
                .max_width(350.0)
                .show(ctx, |ui| {
                    settings::settings_panel(ui, &mut self.config.borrow_mut())
                })
                .inner;
            if changed {
                self.rebuild_adapters();
                self.persist_config();
            }
        }

        // ── Main content ─────────────────────────────────────
        CentralPanel::default().show(ctx, |ui| {
            let action = {
                let store = self.store.borrow();
                chat::chat_panel(ui, &mut self.ui_state, store.current())
            };
            if let Some(action) = action {
                self.handle_chat_action(action, ctx);
            }
        });
    }
}

impl ChatApp {
    fn handle_chat_action(&mut self, action: chat::ChatAction, ctx: &egui::Context) {
        let conversation_id = {
            let mut store = self.store.borrow_mut();
            if store.current().is_none() {
                // Sending into an empty list resurrects a conversation
                store.create();
            }
            store.current_id()
        };

        let service = self.service.clone();
        let chat = self.chat.clone();
        let tts = self.tts.clone();
        let storage = self.storage.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            match action {
                chat::ChatAction::Send(text) => {
                    service
                        .send_message(chat.as_ref(), storage.as_ref(), conversation_id, text)
                        .await;
                }
                chat::ChatAction::Retry(message_id) => {
                    service
                        .retry(chat.as_ref(), storage.as_ref(), conversation_id, message_id)
                        .await;
                }
                chat::ChatAction::Regenerate(message_id) => {
                    service
                        .regenerate(chat.as_ref(), storage.as_ref(), conversation_id, message_id)
                        .await;
                }
                chat::ChatAction::Speak(text) => {
                    service.speak(tts.as_ref(), text).await;
                }
            }
            ctx.request_repaint();
        });
    }
}

//! UI-level state that drives rendering.
//!
//! Message content itself lives in the conversation store; this is the
//! ephemeral chrome around it — input buffer, panel visibility, status line —
//! updated each frame by draining the event bus.

use chat_types::event::ChatEvent;

pub struct UiState {
    /// Input field content
    pub input_text: String,
    /// Whether the settings panel is open
    pub show_settings: bool,
    /// Whether the sidebar is open
    pub show_sidebar: bool,
    /// Status line text
    pub status_text: String,
    /// Whether a stream is currently running
    pub busy: bool,
    /// Conversation being renamed in the sidebar, with the edit buffer
    pub editing_title: Option<(u64, String)>,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            input_text: String::new(),
            show_settings: false,
            show_sidebar: true,
            status_text: "Ready".to_string(),
            busy: false,
            editing_title: None,
        }
    }

    /// Process events from the chat service and update UI state
    pub fn process_events(&mut self, events: Vec<ChatEvent>) {
        for event in events {
            match event {
                ChatEvent::StreamStarted { .. } => {
                    self.busy = true;
                    self.status_text = "Thinking...".to_string();
                }
                ChatEvent::StreamDelta { .. } => {
                    self.status_text = "Streaming".to_string();
                }
                ChatEvent::StreamFinished { .. } => {
                    self.busy = false;
                    self.status_text = "Ready".to_string();
                }
                ChatEvent::StreamFailed { message, .. } => {
                    self.busy = false;
                    self.status_text = format!("Error: {}", message);
                }
                ChatEvent::TitleChanged { .. } => {}
                ChatEvent::Error { message } => {
                    self.status_text = format!("Error: {}", message);
                }
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

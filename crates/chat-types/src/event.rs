use serde::{Deserialize, Serialize};

/// Events published by the chat service while driving a turn.
/// The UI drains these each frame for reactive updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A stream was opened for a conversation
    StreamStarted { conversation_id: u64 },

    /// A content fragment was appended to the in-flight message
    StreamDelta { conversation_id: u64, fragment: String },

    /// The stream completed and the message is final
    StreamFinished { conversation_id: u64 },

    /// The stream failed; the message now carries the error text
    StreamFailed { conversation_id: u64, message: String },

    /// A generated title was applied to a conversation
    TitleChanged { conversation_id: u64, title: String },

    /// An error outside any stream (e.g. missing credential)
    Error { message: String },
}

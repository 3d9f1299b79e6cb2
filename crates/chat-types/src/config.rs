use serde::{Deserialize, Serialize};

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub model: ModelChoice,
    pub api_key: String,
    pub system_prompt: String,
    /// Base URL of the proxy. Empty means same-origin relative requests.
    pub proxy_base: String,
    pub tts: TtsConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: ModelChoice::default(),
            api_key: String::new(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            proxy_base: String::new(),
            tts: TtsConfig::default(),
        }
    }
}

/// The fixed set of selectable models. The label is what the user sees and
/// what gets persisted; the id is what goes on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    Gemini,
    Gpt5,
    Grok,
    Gemini3,
    Kimi,
}

impl ModelChoice {
    pub fn all() -> &'static [ModelChoice] {
        &[
            ModelChoice::Gemini,
            ModelChoice::Gpt5,
            ModelChoice::Grok,
            ModelChoice::Gemini3,
            ModelChoice::Kimi,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelChoice::Gemini => "Gemini",
            ModelChoice::Gpt5 => "GPT 5",
            ModelChoice::Grok => "Grok",
            ModelChoice::Gemini3 => "Gemini 3",
            ModelChoice::Kimi => "Kimi",
        }
    }

    pub fn model_id(&self) -> &'static str {
        match self {
            ModelChoice::Gemini => "google/gemini-2.5-flash",
            ModelChoice::Gpt5 => "openai/gpt-5-mini",
            ModelChoice::Grok => "x-ai/grok-4.1-fast",
            ModelChoice::Gemini3 => "google/gemini-3-pro-preview",
            ModelChoice::Kimi => "moonshotai/kimi-k2-0905",
        }
    }

    /// Resolve a persisted label. Unknown labels fall back to the default.
    pub fn from_label(label: &str) -> ModelChoice {
        ModelChoice::all()
            .iter()
            .copied()
            .find(|m| m.label() == label)
            .unwrap_or_default()
    }
}

/// Text-to-speech request settings. Defaults match what the proxy applies
/// when a parameter is omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    pub voice: String,
    pub model: String,
    pub response_format: String,
    pub prompt: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: "alloy".to_string(),
            model: "tts-1".to_string(),
            response_format: "mp3".to_string(),
            prompt: "Speak in a natural, conversational tone.".to_string(),
        }
    }
}

/// Voices offered by the settings panel.
pub const TTS_VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer clearly and concisely, using Markdown \
     formatting where it helps readability.";

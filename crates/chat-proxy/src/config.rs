use std::env;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";
pub const DEFAULT_CHAT_UPSTREAM: &str = "https://ai.hackclub.com/proxy/v1/chat/completions";
pub const DEFAULT_TTS_UPSTREAM: &str = "https://www.openai.fm/api/generate";

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: String,
    pub chat_upstream: String,
    pub tts_upstream: String,
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            chat_upstream: env::var("CHAT_UPSTREAM")
                .unwrap_or_else(|_| DEFAULT_CHAT_UPSTREAM.to_string()),
            tts_upstream: env::var("TTS_UPSTREAM")
                .unwrap_or_else(|_| DEFAULT_TTS_UPSTREAM.to_string()),
        }
    }
}

//! Text-to-speech adapter.
//!
//! Primary path: fetch synthesized audio from the TTS proxy and play it
//! through an audio element. On any failure it falls back to the browser's
//! on-device speechSynthesis; only when that is also unavailable does the
//! error surface to the caller.

use async_trait::async_trait;

use chat_core::ports::TtsPort;
use chat_types::{config::TtsConfig, ChatError, Result};

use crate::js_error;

pub struct SpeakerAdapter {
    base: String,
    config: TtsConfig,
}

impl SpeakerAdapter {
    pub fn new(base: impl Into<String>, config: TtsConfig) -> Self {
        Self {
            base: base.into(),
            config,
        }
    }

    fn tts_url(&self, input: &str) -> String {
        let encode = |s: &str| String::from(js_sys::encode_uri_component(s));
        format!(
            "{}/api/tts?input={}&model={}&voice={}&response_format={}&prompt={}",
            self.base.trim_end_matches('/'),
            encode(input),
            encode(&self.config.model),
            encode(&self.config.voice),
            encode(&self.config.response_format),
            encode(&self.config.prompt),
        )
    }

    async fn fetch_remote(&self, text: &str) -> Result<Vec<u8>> {
        let response = gloo_net::http::Request::get(&self.tts_url(text))
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(ChatError::Upstream {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .binary()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))
    }

    fn play(&self, audio: Vec<u8>) -> Result<()> {
        let parts = js_sys::Array::new();
        parts.push(&js_sys::Uint8Array::from(audio.as_slice()));

        let options = web_sys::BlobPropertyBag::new();
        options.set_type(&format!("audio/{}", self.config.response_format));

        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(js_error)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_error)?;

        let element = web_sys::HtmlAudioElement::new_with_src(&url).map_err(js_error)?;
        // Fire and forget; playback errors after this point are inaudible
        // silence, not failures worth surfacing.
        let _ = element.play().map_err(js_error)?;
        Ok(())
    }

    fn speak_on_device(&self, text: &str) -> Result<()> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Speech("no window object".to_string()))?;
        let synth = window
            .speech_synthesis()
            .map_err(|e| ChatError::Speech(format!("{:?}", e)))?;
        let utterance = web_sys::SpeechSynthesisUtterance::new_with_text(text)
            .map_err(|e| ChatError::Speech(format!("{:?}", e)))?;
        synth.speak(&utterance);
        Ok(())
    }
}

#[async_trait(?Send)]
impl TtsPort for SpeakerAdapter {
    async fn speak(&self, text: &str) -> Result<()> {
        match self.fetch_remote(text).await {
            Ok(audio) => self.play(audio),
            Err(err) => {
                log::warn!("remote TTS failed ({}), trying on-device synthesis", err);
                self.speak_on_device(text)
            }
        }
    }
}

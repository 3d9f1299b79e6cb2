//! Chat transport through the server-side proxy.
//!
//! Streaming uses the raw browser `fetch()` so the response body can be read
//! incrementally through a `ReadableStream` reader; `gloo-net` reads whole
//! bodies and is only suitable for the non-streamed title request.

use async_trait::async_trait;
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

use chat_core::delta;
use chat_core::ports::{ByteStream, ChatPort, ChatRequest};
use chat_types::{ChatError, Result};

use crate::js_error;

pub struct ProxyChatTransport {
    base: String,
}

impl ProxyChatTransport {
    /// `base` is the proxy origin; empty means same-origin relative requests.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base.trim_end_matches('/'))
    }

    fn build_request_body(req: &ChatRequest) -> serde_json::Value {
        serde_json::json!({
            "model": req.model,
            "messages": req.messages,
            "stream": req.stream,
        })
    }
}

#[async_trait(?Send)]
impl ChatPort for ProxyChatTransport {
    async fn stream_chat(&self, req: &ChatRequest) -> Result<ByteStream> {
        let body = Self::build_request_body(req).to_string();

        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_body(&JsValue::from_str(&body));

        let request = web_sys::Request::new_with_str_and_init(&self.chat_url(), &init)
            .map_err(js_error)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
        request
            .headers()
            .set("Authorization", &format!("Bearer {}", req.api_key))
            .map_err(js_error)?;

        let window = web_sys::window()
            .ok_or_else(|| ChatError::JsInterop("no window object".to_string()))?;
        let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ChatError::Network(format!("{:?}", e)))?
            .dyn_into()
            .map_err(js_error)?;

        if !response.ok() {
            let status = response.status();
            let body = match response.text() {
                Ok(promise) => JsFuture::from(promise)
                    .await
                    .ok()
                    .and_then(|v| v.as_string())
                    .unwrap_or_default(),
                Err(_) => String::new(),
            };
            return Err(ChatError::Upstream { status, body });
        }

        let body_stream = response
            .body()
            .ok_or_else(|| ChatError::Network("response has no body".to_string()))?;
        let reader: ReadableStreamDefaultReader = body_stream
            .get_reader()
            .dyn_into()
            .map_err(|obj| js_error(obj.into()))?;

        let stream = futures::stream::unfold((reader, false), |(reader, failed)| async move {
            if failed {
                return None;
            }
            match JsFuture::from(reader.read()).await {
                Ok(result) => {
                    let done = Reflect::get(&result, &JsValue::from_str("done"))
                        .ok()
                        .and_then(|v| v.as_bool())
                        .unwrap_or(true);
                    if done {
                        return None;
                    }
                    let value = Reflect::get(&result, &JsValue::from_str("value"))
                        .unwrap_or(JsValue::UNDEFINED);
                    let bytes = Uint8Array::new(&value).to_vec();
                    Some((Ok(bytes), (reader, false)))
                }
                Err(err) => Some((
                    Err(ChatError::Network(format!("{:?}", err))),
                    (reader, true),
                )),
            }
        });

        Ok(Box::pin(stream))
    }

    async fn complete(&self, req: &ChatRequest) -> Result<String> {
        let response = gloo_net::http::Request::post(&self.chat_url())
            .header("Authorization", &format!("Bearer {}", req.api_key))
            .json(&Self::build_request_body(req))
            .map_err(|e| ChatError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(ChatError::Upstream {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let payload = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let content = delta::message_content(&payload)?
            .ok_or_else(|| ChatError::Network("empty completion response".to_string()))?;
        Ok(content)
    }
}

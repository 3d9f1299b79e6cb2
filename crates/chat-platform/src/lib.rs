pub mod llm;
pub mod storage;
pub mod tts;

use wasm_bindgen::JsValue;

use chat_types::ChatError;

/// Map an opaque JS exception into the error taxonomy.
pub(crate) fn js_error(err: JsValue) -> ChatError {
    ChatError::JsInterop(format!("{:?}", err))
}

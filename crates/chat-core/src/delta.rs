//! Extraction of content fragments from completion payloads.
//!
//! Streamed chunks carry text at `choices[0].delta.content`; non-streamed
//! responses (title generation) carry it at `choices[0].message.content`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// Extract the incremental fragment from one streamed event payload.
///
/// `Ok(None)` means the event carried no content (role-only or
/// finish-reason-only) and must be a no-op. `Err` means the payload was not
/// valid JSON; callers skip the event without touching the target message.
pub fn delta_content(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let chunk: StreamChunk = serde_json::from_str(payload)?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Extract the full text of a non-streamed completion response.
pub fn message_content(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let completion: Completion = serde_json::from_str(payload)?;
    Ok(completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty()))
}

//! Proxy endpoints.
//!
//! `/api/chat` forwards the request body to the upstream completions API with
//! credential passthrough and pipes the streamed body straight back.
//! `/api/tts` forwards synthesis parameters to the upstream speech API and
//! returns the raw audio payload.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::config::ProxyConfig;

#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub config: Arc<ProxyConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/tts", get(tts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(auth) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
    else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Missing API key"})),
        )
            .into_response();
    };

    let upstream = match state
        .client
        .post(&state.config.chat_upstream)
        .header("authorization", auth)
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
    {
        Ok(upstream) => upstream,
        Err(err) => {
            error!("chat upstream unreachable: {}", err);
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": err.to_string()})),
            )
                .into_response();
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    if !status.is_success() {
        // Upstream status and body verbatim
        let body = upstream.text().await.unwrap_or_default();
        return match Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(Body::from(body))
        {
            Ok(response) => response,
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        };
    }

    info!("streaming chat completion from upstream");
    match Response::builder()
        .header("content-type", "text/event-stream")
        .header("cache-control", "no-cache")
        .body(Body::from_stream(upstream.bytes_stream()))
    {
        Ok(response) => response,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct TtsParams {
    pub input: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub response_format: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct ResolvedTts {
    pub input: String,
    pub model: String,
    pub voice: String,
    pub response_format: String,
    pub prompt: String,
}

/// Apply the fixed defaults. `None` when the required input is missing.
pub fn resolve_tts(params: TtsParams) -> Option<ResolvedTts> {
    let input = params.input.filter(|s| !s.is_empty())?;
    Some(ResolvedTts {
        input,
        model: params.model.unwrap_or_else(|| "tts-1".to_string()),
        voice: params.voice.unwrap_or_else(|| "alloy".to_string()),
        response_format: params.response_format.unwrap_or_else(|| "mp3".to_string()),
        prompt: params
            .prompt
            .unwrap_or_else(|| "Speak in a natural, conversational tone.".to_string()),
    })
}

async fn tts(State(state): State<AppState>, Query(params): Query<TtsParams>) -> Response {
    let Some(req) = resolve_tts(params) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Input text is required"})),
        )
            .into_response();
    };

    let upstream = match state
        .client
        .get(&state.config.tts_upstream)
        .query(&[
            ("input", req.input.as_str()),
            ("prompt", req.prompt.as_str()),
            ("voice", req.voice.as_str()),
            ("model", req.model.as_str()),
            ("response_format", req.response_format.as_str()),
        ])
        .send()
        .await
    {
        Ok(upstream) => upstream,
        Err(err) => {
            error!("TTS upstream unreachable: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response();
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    if !status.is_success() {
        return (status, Json(json!({"error": "Failed to generate audio"}))).into_response();
    }

    match upstream.bytes().await {
        Ok(audio) => {
            match Response::builder()
                .header("content-type", format!("audio/{}", req.response_format))
                .header("cache-control", "no-cache")
                .body(Body::from(audio))
            {
                Ok(response) => response,
                Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            }
        }
        Err(err) => {
            error!("failed to read TTS payload: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}

//! Chat proxy — local development server.

mod config;
mod routes;

use std::sync::Arc;

use tracing::info;

use config::ProxyConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ProxyConfig::from_env();
    info!("chat upstream: {}", config.chat_upstream);
    info!("TTS upstream: {}", config.tts_upstream);

    let state = AppState {
        client: reqwest::Client::new(),
        config: Arc::new(config.clone()),
    };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("proxy listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("proxy shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

//! Webhook HTTP surface.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use teloxide::types::Update;
use tracing::{debug, warn};

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::pipeline;
use crate::telegram::TelegramClient;

/// Shared state handed to every request.
pub struct AppState {
    pub config: Config,
    pub telegram: TelegramClient,
    pub gemini: GeminiClient,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Telegram expects a prompt answer and retries the webhook on timeout,
/// so the update is acknowledged before any real work starts. The
/// duplicate delivery that a slow pipeline can cause is accepted as is.
async fn webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let preview: String = String::from_utf8_lossy(&body).chars().take(500).collect();
    debug!("Webhook body: {preview}");

    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => {
            tokio::spawn(pipeline::process(state, update));
        }
        Err(e) => warn!("Ignoring unparseable update: {e}"),
    }

    (StatusCode::OK, "ok")
}

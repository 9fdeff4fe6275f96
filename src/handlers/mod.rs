pub mod chat;
pub mod health;
pub mod ingest;
pub mod tools;

pub use chat::{chat_handler, clear_history_handler, delete_session_handler};
pub use health::{health_handler, ready_handler};
pub use ingest::ingest_handler;
pub use tools::tools_handler;

use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// All API routes. Metrics and middleware are layered on by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ingest", post(ingest_handler))
        .route("/tools", get(tools_handler))
        .route("/chat", post(chat_handler))
        .route("/sessions/:session_id", delete(delete_session_handler))
        .route("/sessions/:session_id/history", delete(clear_history_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}

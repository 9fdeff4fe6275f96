use crate::error::{AppError, Result};
use crate::ingestion::ingest_documents;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Specification documents to ingest, in order.
    pub swagger_urls: Vec<String>,
    /// Extra system-prompt instructions for this session.
    #[serde(default)]
    pub instructions: String,
    /// Target session; a new one is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub session_id: String,
    pub tool_count: usize,
    pub doc_count: usize,
}

/// POST /ingest - Fetch and normalize specifications into a session's tool set.
///
/// Re-ingesting into an existing session replaces its tools and vocabulary
/// and clears its history.
pub async fn ingest_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>> {
    if request.swagger_urls.is_empty() {
        return Err(AppError::ValidationError(
            "swagger_urls cannot be empty".to_string(),
        ));
    }
    if let Some(blank) = request.swagger_urls.iter().find(|u| u.trim().is_empty()) {
        return Err(AppError::ValidationError(format!(
            "Invalid specification URL: {:?}",
            blank
        )));
    }

    let start = Instant::now();
    let outcome = ingest_documents(&request.swagger_urls, state.fetcher.as_ref()).await?;

    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let tool_count = outcome.tools.len();
    let doc_count = outcome.documents.len();

    state
        .registry
        .set(&session_id, outcome, request.instructions)
        .await;

    tracing::info!(
        session_id = %session_id,
        urls = request.swagger_urls.len(),
        tool_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Ingestion completed"
    );

    metrics::counter!("ingest_requests_total").increment(1);
    metrics::counter!("ingest_tools_total").increment(tool_count as u64);

    Ok(Json(IngestResponse {
        session_id,
        tool_count,
        doc_count,
    }))
}

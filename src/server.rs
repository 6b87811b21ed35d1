//! HTTP transport.
//!
//! A thin axum adapter over the engine: request parsing, the
//! missing-question client error, and outcome passthrough. No engine
//! logic lives here.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::engine::{IngestionPipeline, QueryEngine};
use crate::types::{ChatTurn, IngestOutcome, QueryOutcome};

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The query engine.
    pub engine: Arc<QueryEngine>,
    /// The ingestion pipeline.
    pub ingestion: Arc<IngestionPipeline>,
}

/// Body of `POST /api/load`.
#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    /// Target namespace (tenant/session partition).
    pub namespace: String,
    /// Document source: an `http(s)` URL or a file path.
    pub source: String,
}

/// Body of `POST /api/query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The question to answer. Required; its absence is a client error.
    #[serde(default)]
    pub question: Option<String>,
    /// Namespace to retrieve from.
    pub namespace: String,
    /// Prior conversation turns, chronological.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

/// Builds the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/load", post(load))
        .route("/api/query", post(query))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

async fn load(State(state): State<AppState>, Json(req): Json<LoadRequest>) -> Json<IngestOutcome> {
    Json(state.ingestion.ingest(&req.namespace, &req.source).await)
}

async fn query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryOutcome>, (StatusCode, Json<ErrorBody>)> {
    let Some(question) = req.question.filter(|q| !q.trim().is_empty()) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                success: false,
                message: "question is required".to_string(),
            }),
        ));
    };

    Ok(Json(
        state
            .engine
            .query(&req.namespace, &question, &req.history)
            .await,
    ))
}

use crate::error::failure_status;
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters for catalog search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Free-text query. Missing and blank are both an empty query.
    #[serde(default)]
    pub q: String,
}

/// Rank the catalog against `q` and return the top results.
///
/// The body is always a `SearchResponse`. Failures keep `results` empty and
/// set `error.code`; the status code follows it (503 when the embedding
/// provider is down, 500 for internal faults, 200 otherwise).
pub async fn search(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let response = state.engine.search(&params.q).await;
    let status = response
        .error
        .as_ref()
        .map(|failure| failure_status(failure.code))
        .unwrap_or(StatusCode::OK);
    (status, Json(response))
}

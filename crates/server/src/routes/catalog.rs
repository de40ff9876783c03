use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use index::BuildStats;
use serde::Serialize;
use std::sync::Arc;

/// Snapshot description returned by the stats endpoint
#[derive(Debug, Serialize)]
pub struct CatalogStatsResponse {
    pub size: usize,
    pub dimension: Option<usize>,
    pub normalized: bool,
    pub built_at: String,
    pub provider: String,
    pub top_k: usize,
    pub build: BuildStats,
}

/// Response from a catalog rebuild
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub status: &'static str,
    pub previous_size: usize,
    pub size: usize,
    pub build: BuildStats,
}

/// Reload the catalog file and swap in a freshly built index.
///
/// In-flight searches finish on the old snapshot. A failed rebuild leaves the
/// current snapshot serving.
pub async fn rebuild_catalog(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let records = state.load_records().await?;
    let report = state.engine.rebuild(records).await?;

    Ok(Json(RebuildResponse {
        status: "rebuilt",
        previous_size: report.previous_size,
        size: report.size,
        build: report.stats,
    }))
}

/// Describe the snapshot currently serving searches.
pub async fn catalog_stats(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let snapshot = state.engine.catalog();
    Ok(Json(CatalogStatsResponse {
        size: snapshot.size(),
        dimension: snapshot.dimension(),
        normalized: snapshot.normalized(),
        built_at: snapshot.built_at().to_rfc3339(),
        provider: state.engine.embedder().provider().name().to_string(),
        top_k: state.engine.config().top_k,
        build: snapshot.stats(),
    }))
}

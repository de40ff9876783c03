//! Workspace umbrella crate for semantic catalog search.
//!
//! This crate stitches together the embedding layer (`semantic`), the catalog
//! index (`index`) and the ranker/query handler (`matcher`) so callers can go
//! from a catalog file to ranked results with a single entry point.
//!
//! ```no_run
//! use semsearch::{SearchConfig, SemanticConfig, build_engine_from_path};
//!
//! # async fn run() -> Result<(), semsearch::MatchError> {
//! let engine = build_engine_from_path(
//!     "data/catalog.json",
//!     &SemanticConfig::default(),
//!     SearchConfig::default(),
//! )
//! .await?;
//! let response = engine.search("sneakers").await;
//! println!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub use index::{
    BuildStats, CatalogHandle, CatalogIndex, CatalogRecord, ITEM_TEXT_SEPARATOR, IndexError, Item,
    RecordId, RecordTags, load_catalog, parse_catalog,
};
pub use matcher::{
    FailureCode, K_DEFAULT, MatchError, PARALLEL_THRESHOLD, ScoredResult, SearchConfig,
    SearchEngine, SearchFailure, SearchMetrics, SearchResponse, cosine_similarity, dot, rank,
    set_search_metrics,
};
pub use semantic::{
    ApiProvider, Embedder, EmbeddingProvider, EmbeddingVector, LazyProvider, SemanticConfig,
    SemanticError, StubProvider, TokenOutputs, build_provider, embed_text, l2_norm, l2_normalize,
    mean_pool, pool_and_normalize,
};

#[cfg(feature = "onnx")]
pub use semantic::OnnxProvider;

use std::path::Path;

/// Load a JSON catalog from `path` and build a ready [`SearchEngine`].
///
/// The provider described by `semantic_cfg` is initialized lazily on the
/// first embedding call and shared by the build and every later query.
pub async fn build_engine_from_path(
    path: impl AsRef<Path>,
    semantic_cfg: &SemanticConfig,
    search_cfg: SearchConfig,
) -> Result<SearchEngine, MatchError> {
    let path = path.as_ref();
    let records = load_catalog(path)?;
    tracing::info!(path = %path.display(), records = records.len(), "catalog loaded");
    SearchEngine::from_config(records, semantic_cfg, search_cfg).await
}

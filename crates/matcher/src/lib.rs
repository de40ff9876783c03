//! # Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` sits on top of the embedding layer (`semantic`) and the catalog
//! index (`index`). It scores a query vector against every catalog vector,
//! returns the top-K in a deterministic order, and wraps that in a
//! [`SearchEngine`] that request handlers share.
//!
//! ## Ranking rules
//!
//! - Similarity is cosine. When the query and the index are both unit
//!   normalized it is computed as a plain dot product; otherwise the ranker
//!   divides by the norms explicitly.
//! - Results are sorted by descending score. Equal scores keep catalog order.
//! - At most `k` results come back; `k == 0` yields none.
//! - A query of the wrong width is a [`MatchError::DimensionMismatch`], never
//!   truncated or padded.
//!
//! ## Core Types
//!
//! - [`rank`], [`dot`], [`cosine_similarity`]: pure ranking functions.
//! - [`SearchEngine`]: owns the catalog snapshot slot, the embedder, and the
//!   [`SearchConfig`]; `search` folds every failure into a [`SearchResponse`]
//!   with a [`FailureCode`].
//! - [`SearchMetrics`]: optional global observer for latency and outcomes.
//!
//! ## Example Usage
//!
//! ```no_run
//! use matcher::{SearchConfig, SearchEngine};
//! use index::load_catalog;
//! use semantic::SemanticConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let records = load_catalog("data/catalog.json")?;
//! let engine =
//!     SearchEngine::from_config(records, &SemanticConfig::default(), SearchConfig::default())
//!         .await?;
//!
//! let response = engine.search("sneakers").await;
//! for hit in &response.results {
//!     println!("{:.3} {}", hit.score, hit.item.name);
//! }
//! # Ok(())
//! # }
//! ```

mod engine;
pub mod metrics;
mod ranker;
mod types;

pub use crate::engine::SearchEngine;
pub use crate::metrics::{set_search_metrics, SearchMetrics};
pub use crate::ranker::{cosine_similarity, dot, rank, PARALLEL_THRESHOLD};
pub use crate::types::{
    FailureCode, MatchError, RebuildReport, ScoredResult, SearchConfig, SearchFailure,
    SearchResponse, K_DEFAULT,
};

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use index::{CatalogHandle, CatalogIndex, CatalogRecord};
use lru::LruCache;
use semantic::{Embedder, EmbeddingVector, SemanticConfig};

use crate::metrics::metrics_recorder;
use crate::ranker::rank;
use crate::types::{
    FailureCode, MatchError, RebuildReport, ScoredResult, SearchConfig, SearchResponse,
};


/// The query handler: one catalog snapshot slot, one embedder, one config.
///
/// Construct it once at startup and share it (`Arc<SearchEngine>`) with every
/// request handler. Searches only read the current snapshot; [`rebuild`]
/// builds a replacement off to the side and swaps it in.
///
/// [`rebuild`]: SearchEngine::rebuild
pub struct SearchEngine {
    catalog: CatalogHandle,
    embedder: Embedder,
    config: SearchConfig,
    query_cache: Option<Mutex<LruCache<String, EmbeddingVector>>>,
    rebuild_lock: tokio::sync::Mutex<()>,
}

impl SearchEngine {
    /// Wrap an already built index.
    pub fn new(
        index: CatalogIndex,
        embedder: Embedder,
        config: SearchConfig,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        let query_cache =
            NonZeroUsize::new(config.query_cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Ok(Self {
            catalog: CatalogHandle::new(index),
            embedder,
            config,
            query_cache,
            rebuild_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Embed `records` into a fresh index and wrap it.
    pub async fn build<I>(
        records: I,
        embedder: Embedder,
        config: SearchConfig,
    ) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = CatalogRecord>,
    {
        config.validate()?;
        let index = CatalogIndex::build(records, &embedder, config.build_concurrency).await?;
        if let Some(recorder) = metrics_recorder() {
            recorder.record_rebuild(&index.stats());
        }
        Self::new(index, embedder, config)
    }

    /// Like [`build`](Self::build), with a lazily initialized provider from `semantic_cfg`.
    pub async fn from_config<I>(
        records: I,
        semantic_cfg: &SemanticConfig,
        config: SearchConfig,
    ) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = CatalogRecord>,
    {
        semantic_cfg.validate()?;
        Self::build(records, Embedder::lazy(semantic_cfg.clone()), config).await
    }

    /// Trim and lowercase a raw query. `None` when nothing is left.
    pub fn normalize_query(query: &str) -> Option<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }

    /// Run a query with the configured `top_k` and fold any failure into the response.
    ///
    /// Empty queries return no results without touching the provider. Failures
    /// return no results plus a machine-readable code.
    pub async fn search(&self, query: &str) -> SearchResponse {
        let started = Instant::now();
        let is_blank = query.trim().is_empty();
        let (response, outcome) = match self.try_search(query, self.config.top_k).await {
            Ok(results) => {
                let outcome = if is_blank { "empty_query" } else { "ok" };
                (SearchResponse::ok(results), outcome)
            }
            Err(err) => {
                let code = err.failure_code();
                match code {
                    FailureCode::ProviderUnavailable => {
                        tracing::warn!(error = %err, "search unavailable: embedding provider failed")
                    }
                    FailureCode::DegenerateQuery => {
                        tracing::debug!(query, "query embedded to a degenerate vector")
                    }
                    FailureCode::InternalError => {
                        tracing::error!(error = %err, "search failed")
                    }
                }
                (SearchResponse::failed(&err), code.as_str())
            }
        };

        if let Some(recorder) = metrics_recorder() {
            recorder.record_search(outcome, started.elapsed(), response.results.len());
        }
        response
    }

    /// Rank the current catalog against `query`, surfacing errors to the caller.
    pub async fn try_search(&self, query: &str, k: usize) -> Result<Vec<ScoredResult>, MatchError> {
        let Some(normalized) = Self::normalize_query(query) else {
            return Ok(Vec::new());
        };
        let vector = self.query_vector(&normalized).await?;
        let snapshot = self.catalog.snapshot();
        let results = rank(&vector, &snapshot, k)?;
        tracing::debug!(query = %normalized, hits = results.len(), "search ranked");
        Ok(results)
    }

    /// Build a new index from `records` and swap it in.
    ///
    /// Searches keep using the previous snapshot until the swap. If the build
    /// fails, the previous snapshot stays in place. Concurrent rebuilds run one
    /// at a time, so the reported sizes belong to this rebuild's own swap.
    pub async fn rebuild<I>(&self, records: I) -> Result<RebuildReport, MatchError>
    where
        I: IntoIterator<Item = CatalogRecord>,
    {
        let _guard = self.rebuild_lock.lock().await;
        let index =
            CatalogIndex::build(records, &self.embedder, self.config.build_concurrency).await?;
        let stats = index.stats();
        let size = index.size();
        let previous = self.catalog.replace(index);
        let report = RebuildReport {
            previous_size: previous.size(),
            size,
            stats,
        };
        tracing::info!(
            previous_size = report.previous_size,
            size = report.size,
            "catalog index swapped"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_rebuild(&stats);
        }
        Ok(report)
    }

    /// The catalog snapshot in effect right now.
    pub fn catalog(&self) -> Arc<CatalogIndex> {
        self.catalog.snapshot()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    async fn query_vector(&self, normalized: &str) -> Result<EmbeddingVector, MatchError> {
        if let Some(cache) = &self.query_cache {
            let hit = cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(normalized)
                .cloned();
            if let Some(vector) = hit {
                tracing::debug!(query = normalized, "query vector cache hit");
                return Ok(vector);
            }
        }

        let vector = self.embedder.embed(normalized).await?;

        if let Some(cache) = &self.query_cache {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(normalized.to_owned(), vector.clone());
        }
        Ok(vector)
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("catalog_size", &self.catalog.snapshot().size())
            .field("embedder", &self.embedder)
            .field("config", &self.config)
            .finish()
    }
}

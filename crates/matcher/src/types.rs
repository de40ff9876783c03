use index::{BuildStats, IndexError, Item};
use semantic::SemanticError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of results a search returns unless configured otherwise.
pub const K_DEFAULT: usize = 9;

/// Engine-wide knobs. Cheap to clone and serde-friendly so it can be nested
/// in higher-level configs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Maximum number of results per query.
    #[serde(default = "SearchConfig::default_top_k")]
    pub top_k: usize,
    /// Embedding calls in flight while building the catalog index.
    #[serde(default = "SearchConfig::default_build_concurrency")]
    pub build_concurrency: usize,
    /// Normalized query strings whose vectors are kept in memory. `0` disables the cache.
    #[serde(default = "SearchConfig::default_query_cache_capacity")]
    pub query_cache_capacity: usize,
}

impl SearchConfig {
    pub(crate) fn default_top_k() -> usize {
        K_DEFAULT
    }

    pub(crate) fn default_build_concurrency() -> usize {
        8
    }

    pub(crate) fn default_query_cache_capacity() -> usize {
        256
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.top_k == 0 {
            return Err(MatchError::InvalidConfig(
                "top_k must be greater than zero".into(),
            ));
        }
        if self.build_concurrency == 0 {
            return Err(MatchError::InvalidConfig(
                "build_concurrency must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: Self::default_top_k(),
            build_concurrency: Self::default_build_concurrency(),
            query_cache_capacity: Self::default_query_cache_capacity(),
        }
    }
}

/// One ranked catalog item. The item's fields are inlined in JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub item: Item,
    /// Cosine similarity to the query, in `[-1, 1]`.
    pub score: f32,
    /// Position of the item in the catalog index.
    pub position: usize,
}

/// Machine-readable reason attached to a failed search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// The embedding provider could not produce a query vector.
    ProviderUnavailable,
    /// The query embedded to a zero-norm vector.
    DegenerateQuery,
    /// A bug-class failure such as a dimension mismatch.
    InternalError,
}

impl FailureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCode::ProviderUnavailable => "provider_unavailable",
            FailureCode::DegenerateQuery => "degenerate_query",
            FailureCode::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchFailure {
    pub code: FailureCode,
    pub message: String,
}

/// What a search hands back to the boundary: ranked results, or an empty
/// list plus the reason. Never partial results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<ScoredResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchFailure>,
}

impl SearchResponse {
    pub fn ok(results: Vec<ScoredResult>) -> Self {
        Self {
            results,
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failed(err: &MatchError) -> Self {
        Self {
            results: Vec::new(),
            error: Some(SearchFailure {
                code: err.failure_code(),
                message: err.to_string(),
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Errors produced by ranking and query handling.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid search config: {0}")]
    InvalidConfig(String),
    /// Query vector width differs from the catalog's.
    #[error("query has dimension {found}, catalog index has {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    /// A similarity came out NaN or infinite.
    #[error("non-finite score for catalog position {position}")]
    InvalidScore { position: usize },
    /// Embedding the query failed.
    #[error("query embedding failed: {0}")]
    Embedding(#[from] SemanticError),
    /// Building or reading the catalog index failed.
    #[error("catalog index error: {0}")]
    Index(#[from] IndexError),
}

impl MatchError {
    pub fn failure_code(&self) -> FailureCode {
        match self {
            MatchError::Embedding(err) if err.is_degenerate() => FailureCode::DegenerateQuery,
            MatchError::Embedding(err) if err.is_provider_failure() => {
                FailureCode::ProviderUnavailable
            }
            MatchError::Index(err) if err.is_provider_failure() => {
                FailureCode::ProviderUnavailable
            }
            _ => FailureCode::InternalError,
        }
    }
}

/// What a [`SearchEngine::rebuild`](crate::SearchEngine::rebuild) swapped out and in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    /// Size of the snapshot this rebuild replaced.
    pub previous_size: usize,
    /// Size of the snapshot this rebuild installed.
    pub size: usize,
    pub stats: BuildStats,
}

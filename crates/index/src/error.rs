use semantic::SemanticError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    /// Positional accessor called outside `[0, size())`.
    #[error("index {index} out of range for catalog of size {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// An item's vector width differs from the rest of the catalog.
    #[error("item `{id}` has dimension {found}, expected {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
    /// Embedding an item failed; the build was abandoned.
    #[error("failed to embed item `{id}`: {source}")]
    Embedding {
        id: String,
        #[source]
        source: SemanticError,
    },
    /// Parallel item/vector sequences of different lengths.
    #[error("{items} items but {vectors} vectors")]
    LengthMismatch { items: usize, vectors: usize },
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl IndexError {
    /// True when the embedding provider (not the catalog data) caused the failure.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, IndexError::Embedding { source, .. } if source.is_provider_failure())
    }
}

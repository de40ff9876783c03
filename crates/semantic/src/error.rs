use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Boxed upstream cause carried by provider failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced while turning text into an [`EmbeddingVector`](crate::EmbeddingVector).
#[derive(Debug, Error)]
pub enum SemanticError {
    /// Configuration is inconsistent (e.g., api mode without an endpoint).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// The ONNX model could not be located locally.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON is missing.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    /// The embedding provider failed (model error, HTTP failure, timeout).
    #[error("embedding provider `{provider}` failed: {message}")]
    Provider {
        provider: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// The provider answered, but its output cannot be pooled.
    #[error("invalid provider output: {0}")]
    InvalidOutput(String),
    /// Pooled vector has zero (or non-finite) norm and cannot be normalized.
    #[error("degenerate embedding vector (dim {dim}): norm is zero or non-finite")]
    DegenerateVector { dim: usize },
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl SemanticError {
    /// Provider failure without an underlying error value.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        SemanticError::Provider {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Provider failure that keeps the upstream cause attached.
    pub fn provider_with_source<E>(
        provider: impl Into<String>,
        message: impl Into<String>,
        source: E,
    ) -> Self
    where
        E: Into<BoxError>,
    {
        SemanticError::Provider {
            provider: provider.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// True for failures that originate in the embedding provider rather than in pooling.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            SemanticError::Provider { .. }
                | SemanticError::ModelNotFound(_)
                | SemanticError::TokenizerMissing(_)
                | SemanticError::Io(_)
        )
    }

    /// True when the text produced a zero-norm vector.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, SemanticError::DegenerateVector { .. })
    }
}

//! The embedding provider seam: raw model output in, pooled vectors out.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::api::ApiProvider;
use crate::pooling::pool_and_normalize;
use crate::stub::StubProvider;
use crate::{EmbeddingVector, SemanticConfig, SemanticError, TokenOutputs};

/// Maps one text to the model's per-token hidden states.
///
/// Implementations may suspend (network, inference); everything downstream of
/// them is synchronous and CPU-bound.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short label used in logs and error messages.
    fn name(&self) -> &str;

    /// Run the model on `text`. Failures surface as [`SemanticError::Provider`].
    async fn embed_raw(&self, text: &str) -> Result<TokenOutputs, SemanticError>;
}

/// Construct the provider selected by `cfg.mode`.
///
/// This is the expensive step (model load, HTTP client setup); callers that
/// share a provider should go through [`LazyProvider`].
pub async fn build_provider(
    cfg: &SemanticConfig,
) -> Result<Arc<dyn EmbeddingProvider>, SemanticError> {
    cfg.validate()?;
    let provider: Arc<dyn EmbeddingProvider> = match cfg.mode.as_str() {
        "stub" => Arc::new(StubProvider::new(cfg.stub_dim)),
        "api" => Arc::new(ApiProvider::from_config(cfg)?),
        #[cfg(feature = "onnx")]
        "onnx" => Arc::new(crate::onnx::OnnxProvider::from_config(cfg)?),
        #[cfg(not(feature = "onnx"))]
        "onnx" => {
            return Err(SemanticError::InvalidConfig(
                "onnx mode requires the `onnx` cargo feature".into(),
            ))
        }
        other => {
            return Err(SemanticError::InvalidConfig(format!(
                "unknown semantic mode '{other}'"
            )))
        }
    };
    tracing::info!(
        provider = provider.name(),
        model = %cfg.model_name,
        "embedding provider initialized"
    );
    Ok(provider)
}

/// Provider handle that defers construction until first use.
///
/// Initialization runs at most once per handle: concurrent first callers wait
/// on the same in-flight initialization and then all observe the same
/// instance. A failed initialization is not cached, so a later call retries.
pub struct LazyProvider {
    cfg: SemanticConfig,
    cell: OnceCell<Arc<dyn EmbeddingProvider>>,
}

impl LazyProvider {
    pub fn new(cfg: SemanticConfig) -> Self {
        Self {
            cfg,
            cell: OnceCell::new(),
        }
    }

    /// The shared provider, initializing it on first call.
    pub async fn get(&self) -> Result<Arc<dyn EmbeddingProvider>, SemanticError> {
        self.cell
            .get_or_try_init(|| build_provider(&self.cfg))
            .await
            .cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.cfg
    }
}

#[async_trait]
impl EmbeddingProvider for LazyProvider {
    fn name(&self) -> &str {
        self.cfg.mode.as_str()
    }

    async fn embed_raw(&self, text: &str) -> Result<TokenOutputs, SemanticError> {
        let provider = self.get().await?;
        provider.embed_raw(text).await
    }
}

/// Text → unit vector pipeline: provider call, mean pooling, L2 normalization.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    normalize: bool,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, normalize: bool) -> Self {
        Self {
            provider,
            normalize,
        }
    }

    /// Embedder over a [`LazyProvider`] built from `cfg`.
    pub fn lazy(cfg: SemanticConfig) -> Self {
        let normalize = cfg.normalize;
        Self::new(Arc::new(LazyProvider::new(cfg)), normalize)
    }

    pub async fn embed(&self, text: &str) -> Result<EmbeddingVector, SemanticError> {
        let outputs = self.provider.embed_raw(text).await?;
        pool_and_normalize(&outputs, self.normalize)
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("provider", &self.provider.name())
            .field("normalize", &self.normalize)
            .finish()
    }
}

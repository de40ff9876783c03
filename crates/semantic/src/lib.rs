//! Semantic embeddings for catalog search
//!
//! This crate turns text into fixed-length vectors you can compare with a dot
//! product. A provider produces one hidden-state vector per token, we average
//! them (mean pooling) and scale the result to unit length (L2 normalization).
//!
//! Providers:
//!
//! - **Stub mode** - Deterministic and offline. Texts that share words land close
//!   together. Good for tests and demos, useless for real semantics.
//! - **API mode** - Hugging Face style feature-extraction endpoint over HTTP.
//! - **ONNX mode** - Local model, behind the `onnx` cargo feature.
//!
//! There is no silent fallback: if the provider fails you get
//! [`SemanticError::Provider`] and the caller decides what to do. A text whose
//! pooled vector has zero norm (no tokens, or tokens that cancel out) is a
//! [`SemanticError::DegenerateVector`], never a vector full of NaNs.
//!
//! ## Threading notes
//!
//! [`LazyProvider`] defers the expensive setup (model load, HTTP client) to the
//! first call, and concurrent first callers share one initialization. ONNX
//! sessions are cached per blocking-pool thread.
//!
//! ## Quick example
//!
//! ```no_run
//! use semantic::{Embedder, SemanticConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let embedder = Embedder::lazy(SemanticConfig {
//!         mode: "api".into(),
//!         api_url: Some("https://router.huggingface.co/hf-inference/models/sentence-transformers/multi-qa-mpnet-base-dot-v1/pipeline/feature-extraction".into()),
//!         api_auth_header: Some("Bearer YOUR_HF_TOKEN".into()),
//!         ..Default::default()
//!     });
//!
//!     let vector = embedder.embed("waterproof hiking boots").await.unwrap();
//!     assert!(vector.normalized);
//! }
//! ```

pub mod config;
pub mod error;
pub mod types;

mod api;
mod normalize;
mod pooling;
mod provider;
mod stub;

#[cfg(feature = "onnx")]
mod assets;
#[cfg(feature = "onnx")]
mod cache;
#[cfg(feature = "onnx")]
mod onnx;

pub use crate::api::ApiProvider;
pub use crate::config::SemanticConfig;
pub use crate::error::SemanticError;
pub use crate::normalize::{l2_norm, l2_normalize, l2_normalize_in_place};
#[cfg(feature = "onnx")]
pub use crate::onnx::OnnxProvider;
pub use crate::pooling::{mean_pool, pool_and_normalize};
pub use crate::provider::{build_provider, Embedder, EmbeddingProvider, LazyProvider};
pub use crate::stub::StubProvider;
pub use crate::types::{EmbeddingVector, TokenOutputs};

/// One-shot helper: build the provider from `cfg`, embed `text`, pool and normalize.
///
/// Builds a fresh provider on every call. Anything that embeds more than once
/// should hold an [`Embedder`] instead.
pub async fn embed_text(text: &str, cfg: &SemanticConfig) -> Result<EmbeddingVector, SemanticError> {
    let provider = build_provider(cfg).await?;
    Embedder::new(provider, cfg.normalize).embed(text).await
}

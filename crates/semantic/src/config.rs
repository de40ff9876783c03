use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SemanticError;

/// Runtime configuration describing which embedding provider to use and how
/// to post-process its output.
///
/// # Example
/// ```no_run
/// use semantic::SemanticConfig;
///
/// let cfg = SemanticConfig {
///     mode: "api".into(),
///     api_url: Some("https://router.huggingface.co/hf-inference/models/sentence-transformers/multi-qa-mpnet-base-dot-v1/pipeline/feature-extraction".into()),
///     api_auth_header: Some("Bearer hf_xxx".into()),
///     ..Default::default()
/// };
/// cfg.validate().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// Provider selector: `"stub"` (deterministic, offline), `"api"` (remote
    /// feature-extraction endpoint) or `"onnx"` (local model, needs the `onnx` feature).
    pub mode: String,
    /// Friendly label for logs and stats.
    pub model_name: String,
    /// L2-normalize pooled vectors. Ranking falls back to full cosine when off.
    pub normalize: bool,
    /// Hidden width produced by the stub provider.
    pub stub_dim: usize,
    /// Feature-extraction endpoint when [`mode`](Self::mode) is `"api"`.
    pub api_url: Option<String>,
    /// Authorization header (e.g., `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    /// Overall API timeout in seconds.
    pub api_timeout_secs: Option<u64>,
    /// Local ONNX model file.
    pub model_path: PathBuf,
    /// Local `tokenizer.json`.
    pub tokenizer_path: Option<PathBuf>,
    /// Tokens beyond this limit are truncated before inference.
    pub max_sequence_length: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: "stub".into(),
            model_name: "multi-qa-mpnet-base-dot-v1".into(),
            normalize: true,
            stub_dim: 768,
            api_url: None,
            api_auth_header: None,
            api_timeout_secs: Some(30),
            model_path: PathBuf::from("./models/multi-qa-mpnet-base-dot-v1/onnx/model.onnx"),
            tokenizer_path: Some(PathBuf::from(
                "./models/multi-qa-mpnet-base-dot-v1/tokenizer.json",
            )),
            max_sequence_length: 512,
        }
    }
}

impl SemanticConfig {
    /// Check the combination of settings for the selected mode.
    pub fn validate(&self) -> Result<(), SemanticError> {
        match self.mode.as_str() {
            "stub" => {
                if self.stub_dim == 0 {
                    return Err(SemanticError::InvalidConfig(
                        "stub_dim must be greater than zero".into(),
                    ));
                }
            }
            "api" => {
                let url = self.api_url.as_deref().unwrap_or("").trim();
                if url.is_empty() {
                    return Err(SemanticError::InvalidConfig(
                        "api_url is required for api mode".into(),
                    ));
                }
                if self.api_timeout_secs == Some(0) {
                    return Err(SemanticError::InvalidConfig(
                        "api_timeout_secs must be greater than zero".into(),
                    ));
                }
            }
            "onnx" => {
                if self.tokenizer_path.is_none() {
                    return Err(SemanticError::InvalidConfig(
                        "tokenizer_path is required for onnx mode".into(),
                    ));
                }
                if self.max_sequence_length == 0 {
                    return Err(SemanticError::InvalidConfig(
                        "max_sequence_length must be greater than zero".into(),
                    ));
                }
            }
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "unknown semantic mode '{other}' (expected stub, api or onnx)"
                )));
            }
        }
        Ok(())
    }
}

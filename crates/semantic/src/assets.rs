use std::path::PathBuf;

use crate::{SemanticConfig, SemanticError};

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub(crate) struct ModelAssets {
    pub(crate) model_path: PathBuf,
    pub(crate) tokenizer_path: PathBuf,
}

/// Locate the model and tokenizer files on disk.
pub(crate) fn resolve_model_assets(cfg: &SemanticConfig) -> Result<ModelAssets, SemanticError> {
    if !cfg.model_path.is_file() {
        return Err(SemanticError::ModelNotFound(
            cfg.model_path.display().to_string(),
        ));
    }

    let tokenizer_path = match &cfg.tokenizer_path {
        Some(path) if path.is_file() => path.clone(),
        Some(path) => {
            return Err(SemanticError::TokenizerMissing(path.display().to_string()));
        }
        None => return Err(SemanticError::TokenizerMissing(cfg.model_name.clone())),
    };

    Ok(ModelAssets {
        model_path: cfg.model_path.clone(),
        tokenizer_path,
    })
}

use once_cell::sync::OnceCell;
use onnxruntime::{environment::Environment, session::Session};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tokenizers::Tokenizer;

use crate::assets::ModelAssets;
use crate::SemanticError;

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

// ONNX sessions are not Sync; every blocking-pool thread keeps its own.
thread_local! {
    static MODEL_CACHE: RefCell<HashMap<ModelAssets, Rc<CachedModel>>> =
        RefCell::new(HashMap::new());
}

pub(crate) struct CachedModel {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) session: RefCell<Session<'static>>,
}

impl CachedModel {
    fn load(assets: &ModelAssets) -> Result<Self, SemanticError> {
        let tokenizer = Tokenizer::from_file(&assets.tokenizer_path).map_err(|e| {
            SemanticError::TokenizerMissing(format!(
                "{}: {e}",
                assets.tokenizer_path.display()
            ))
        })?;

        let env = ort_environment()?;
        let session = env
            .new_session_builder()
            .map_err(|e| SemanticError::provider_with_source("onnx", "session builder", e))?
            .with_model_from_file(assets.model_path.clone())
            .map_err(|e| SemanticError::provider_with_source("onnx", "model load failed", e))?;

        Ok(Self {
            tokenizer,
            session: RefCell::new(session),
        })
    }
}

pub(crate) fn get_or_load_model(assets: &ModelAssets) -> Result<Rc<CachedModel>, SemanticError> {
    MODEL_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(handle) = cache.get(assets) {
            return Ok(handle.clone());
        }

        tracing::debug!(model = %assets.model_path.display(), "loading onnx session for thread");
        let handle = Rc::new(CachedModel::load(assets)?);
        cache.insert(assets.clone(), handle.clone());
        Ok(handle)
    })
}

fn ort_environment() -> Result<&'static Environment, SemanticError> {
    ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("semsearch")
            .build()
            .map_err(|e| SemanticError::provider_with_source("onnx", "runtime environment", e))
    })
}

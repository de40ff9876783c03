use async_trait::async_trait;
use onnxruntime::ndarray::{Array, Array2};
use onnxruntime::session::Session;
use std::cell::RefCell;

use crate::assets::{resolve_model_assets, ModelAssets};
use crate::cache::get_or_load_model;
use crate::provider::EmbeddingProvider;
use crate::{SemanticConfig, SemanticError, TokenOutputs};

const PROVIDER_NAME: &str = "onnx";

/// Local transformer inference through ONNX Runtime.
///
/// Returns the first output tensor (the last hidden state, `(1, L, D)`).
/// Inference runs on Tokio's blocking pool with one cached session per thread.
#[derive(Debug, Clone)]
pub struct OnnxProvider {
    assets: ModelAssets,
    max_sequence_length: usize,
}

impl OnnxProvider {
    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let assets = resolve_model_assets(cfg)?;
        Ok(Self {
            assets,
            max_sequence_length: cfg.max_sequence_length,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OnnxProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn embed_raw(&self, text: &str) -> Result<TokenOutputs, SemanticError> {
        let assets = self.assets.clone();
        let max_len = self.max_sequence_length;
        let text = text.to_owned();

        tokio::task::spawn_blocking(move || {
            let handle = get_or_load_model(&assets)?;
            let (ids, mask) = encode(&handle.tokenizer, &text, max_len)?;
            run_session(&handle.session, ids, mask)
        })
        .await
        .map_err(|e| SemanticError::provider_with_source(PROVIDER_NAME, "inference task failed", e))?
    }
}

fn encode(
    tokenizer: &tokenizers::Tokenizer,
    text: &str,
    max_len: usize,
) -> Result<(Array2<i64>, Array2<i64>), SemanticError> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| SemanticError::provider(PROVIDER_NAME, format!("tokenization failed: {e}")))?;

    let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&x| i64::from(x)).collect();
    let mut mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&x| i64::from(x))
        .collect();
    ids.truncate(max_len);
    mask.truncate(max_len);

    let len = ids.len();
    let ids = Array::from_shape_vec((1, len), ids)
        .map_err(|e| SemanticError::InvalidOutput(e.to_string()))?;
    let mask = Array::from_shape_vec((1, len), mask)
        .map_err(|e| SemanticError::InvalidOutput(e.to_string()))?;
    Ok((ids, mask))
}

fn run_session(
    session: &RefCell<Session<'static>>,
    input_ids: Array2<i64>,
    attn_mask: Array2<i64>,
) -> Result<TokenOutputs, SemanticError> {
    let (batch, seq_len) = input_ids.dim();
    let mut guard = session.borrow_mut();
    let session = &mut *guard;

    let mut inputs = Vec::with_capacity(session.inputs.len());
    let mut input_ids = Some(input_ids);
    let mut attn_mask = Some(attn_mask);
    for input in &session.inputs {
        let tensor = match input.name.as_str() {
            "input_ids" => input_ids.take(),
            "attention_mask" => attn_mask.take(),
            "token_type_ids" => Some(Array::from_elem((batch, seq_len), 0_i64)),
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "unsupported model input '{other}'"
                )))
            }
        }
        .ok_or_else(|| {
            SemanticError::InvalidConfig(format!("model requested `{}` twice", input.name))
        })?;
        inputs.push(tensor.into_dyn());
    }

    let outputs = session
        .run::<i64, f32, _>(inputs)
        .map_err(|e| SemanticError::provider_with_source(PROVIDER_NAME, "inference failed", e))?;
    let hidden = outputs
        .into_iter()
        .next()
        .ok_or_else(|| SemanticError::InvalidOutput("model returned no outputs".into()))?;

    let shape = hidden.shape().to_vec();
    let data: Vec<f32> = hidden.iter().copied().collect();
    TokenOutputs::new(shape, data)
}

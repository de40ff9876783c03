use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::provider::EmbeddingProvider;
use crate::{SemanticConfig, SemanticError, TokenOutputs};

const PROVIDER_NAME: &str = "api";

/// Remote feature-extraction endpoint (Hugging Face style).
///
/// Sends `{"inputs": text}` and expects the per-token hidden states back as
/// nested arrays. Sentence-level responses (`[f32]`, `{"embeddings": ...}`,
/// OpenAI-style `{"data": [{"embedding": ...}]}`) are accepted as a single token.
#[derive(Debug, Clone)]
pub struct ApiProvider {
    client: reqwest::Client,
    url: String,
    auth_header: Option<String>,
}

impl ApiProvider {
    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let url = cfg
            .api_url
            .clone()
            .ok_or_else(|| SemanticError::InvalidConfig("api_url is required for api mode".into()))?;
        let timeout = Duration::from_secs(cfg.api_timeout_secs.unwrap_or(30));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| SemanticError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url,
            auth_header: cfg.api_auth_header.clone(),
        })
    }

    async fn send(&self, text: &str) -> Result<Value, SemanticError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json");
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request
            .json(&json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| SemanticError::provider_with_source(PROVIDER_NAME, "HTTP request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SemanticError::provider(
                PROVIDER_NAME,
                format!("HTTP error {status}: {body}"),
            ));
        }

        response.json::<Value>().await.map_err(|e| {
            SemanticError::provider_with_source(PROVIDER_NAME, "invalid JSON response", e)
        })
    }
}

#[async_trait]
impl EmbeddingProvider for ApiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn embed_raw(&self, text: &str) -> Result<TokenOutputs, SemanticError> {
        let response = self.send(text).await?;
        token_outputs_from_value(response)
    }
}

/// Decode a feature-extraction response into [`TokenOutputs`].
pub(crate) fn token_outputs_from_value(value: Value) -> Result<TokenOutputs, SemanticError> {
    let value = match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                embeddings
            } else if let Some(Value::Array(items)) = map.remove("data") {
                let first = items.into_iter().next().ok_or_else(|| {
                    SemanticError::InvalidOutput("response `data` array is empty".into())
                })?;
                match first {
                    Value::Object(mut obj) => obj.remove("embedding").ok_or_else(|| {
                        SemanticError::InvalidOutput("`data` entry lacks `embedding`".into())
                    })?,
                    other => other,
                }
            } else {
                return Err(SemanticError::InvalidOutput(
                    "response object has neither `embeddings` nor `data`".into(),
                ));
            }
        }
        other => other,
    };

    let mut shape = Vec::new();
    let mut data = Vec::new();
    flatten(&value, 0, &mut shape, &mut data)?;

    match shape.len() {
        1 => TokenOutputs::new(vec![1, shape[0]], data),
        2 | 3 => TokenOutputs::new(shape, data),
        depth => Err(SemanticError::InvalidOutput(format!(
            "unsupported nesting depth {depth}"
        ))),
    }
}

/// Depth-first walk recording the length seen at each depth; ragged arrays are rejected.
///
/// The first number fixes the leaf depth at `shape.len()`. After that no array
/// may open a new level.
fn flatten(
    value: &Value,
    depth: usize,
    shape: &mut Vec<usize>,
    data: &mut Vec<f32>,
) -> Result<(), SemanticError> {
    match value {
        Value::Array(items) => {
            match shape.get(depth) {
                Some(&len) if len != items.len() => {
                    return Err(SemanticError::InvalidOutput(format!(
                        "ragged array at depth {depth}: {} vs {len}",
                        items.len()
                    )))
                }
                Some(_) => {}
                None if shape.len() == depth && data.is_empty() => shape.push(items.len()),
                None => {
                    return Err(SemanticError::InvalidOutput(
                        "inconsistent nesting in response".into(),
                    ))
                }
            }
            for item in items {
                flatten(item, depth + 1, shape, data)?;
            }
            Ok(())
        }
        Value::Number(n) => {
            if depth != shape.len() || depth == 0 {
                return Err(SemanticError::InvalidOutput(
                    "number found at an unexpected depth".into(),
                ));
            }
            let v = n
                .as_f64()
                .ok_or_else(|| SemanticError::InvalidOutput(format!("non-numeric value {n}")))?;
            data.push(v as f32);
            Ok(())
        }
        other => Err(SemanticError::InvalidOutput(format!(
            "expected numeric arrays, got {other}"
        ))),
    }
}

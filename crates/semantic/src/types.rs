use serde::{Deserialize, Serialize};

use crate::SemanticError;

/// Raw per-token output of an embedding model for a single text.
///
/// `data` is the row-major flat buffer described by `shape`, which is either
/// `[L, D]` or `[1, L, D]` when the provider keeps a batch dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenOutputs {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl TokenOutputs {
    /// Wrap a flat buffer, checking that `shape` accounts for every value.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, SemanticError> {
        if shape.len() != 2 && shape.len() != 3 {
            return Err(SemanticError::InvalidOutput(format!(
                "expected shape (L, D) or (1, L, D), got {shape:?}"
            )));
        }
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(SemanticError::InvalidOutput(format!(
                "shape {shape:?} describes {expected} values but buffer holds {}",
                data.len()
            )));
        }
        let outputs = Self { shape, data };
        outputs.dims()?;
        Ok(outputs)
    }

    /// Build from one hidden-state vector per token.
    pub fn from_tokens(tokens: Vec<Vec<f32>>, dim: usize) -> Result<Self, SemanticError> {
        let seq_len = tokens.len();
        let mut data = Vec::with_capacity(seq_len * dim);
        for (idx, token) in tokens.into_iter().enumerate() {
            if token.len() != dim {
                return Err(SemanticError::InvalidOutput(format!(
                    "token {idx} has width {} but expected {dim}",
                    token.len()
                )));
            }
            data.extend(token);
        }
        Self::new(vec![seq_len, dim], data)
    }

    /// `(L, D)` with any leading batch dimension stripped.
    pub fn dims(&self) -> Result<(usize, usize), SemanticError> {
        match self.shape.as_slice() {
            [seq_len, dim] => Ok((*seq_len, *dim)),
            [1, seq_len, dim] => Ok((*seq_len, *dim)),
            [batch, _, _] => Err(SemanticError::InvalidOutput(format!(
                "expected a single text but output has batch size {batch}"
            ))),
            other => Err(SemanticError::InvalidOutput(format!(
                "unsupported output rank {}",
                other.len()
            ))),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Iterate over the hidden-state vector of each token.
    pub fn tokens(&self) -> Result<std::slice::ChunksExact<'_, f32>, SemanticError> {
        let (_, dim) = self.dims()?;
        if dim == 0 {
            return Err(SemanticError::InvalidOutput(
                "hidden dimension must be non-zero".into(),
            ));
        }
        Ok(self.data.chunks_exact(dim))
    }
}

/// A fixed-length embedding, unit-length when `normalized` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    /// Vector components.
    pub values: Vec<f32>,
    /// Whether [`values`](Self::values) was L2-normalized. Rankers rely on this
    /// flag to decide between a plain dot product and the full cosine formula.
    pub normalized: bool,
}

impl EmbeddingVector {
    pub fn new(values: Vec<f32>, normalized: bool) -> Self {
        Self { values, normalized }
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        crate::normalize::l2_norm(&self.values)
    }
}

//! Token outputs → one fixed-length vector per text.

use crate::normalize::{ensure_non_degenerate, l2_normalize};
use crate::{EmbeddingVector, SemanticError, TokenOutputs};

/// Arithmetic mean of every token vector, dimension by dimension.
///
/// Sums are accumulated in f64. An empty token sequence has no mean and is
/// reported as [`SemanticError::DegenerateVector`]; non-finite model outputs are
/// rejected as [`SemanticError::InvalidOutput`].
pub fn mean_pool(outputs: &TokenOutputs) -> Result<Vec<f32>, SemanticError> {
    let (seq_len, dim) = outputs.dims()?;
    if seq_len == 0 {
        return Err(SemanticError::DegenerateVector { dim });
    }
    if let Some(pos) = outputs.data().iter().position(|x| !x.is_finite()) {
        return Err(SemanticError::InvalidOutput(format!(
            "non-finite value at token {} dim {}",
            pos / dim.max(1),
            pos % dim.max(1)
        )));
    }

    let mut sums = vec![0f64; dim];
    for token in outputs.tokens()? {
        for (acc, &value) in sums.iter_mut().zip(token) {
            *acc += f64::from(value);
        }
    }

    let n = seq_len as f64;
    Ok(sums.into_iter().map(|s| (s / n) as f32).collect())
}

/// Mean pooling followed by L2 normalization when `normalize` is set.
///
/// With `normalize == false` the pooled vector is returned as-is (flagged
/// `normalized: false`), but a zero-norm result is still rejected.
pub fn pool_and_normalize(
    outputs: &TokenOutputs,
    normalize: bool,
) -> Result<EmbeddingVector, SemanticError> {
    let pooled = mean_pool(outputs)?;
    if normalize {
        Ok(EmbeddingVector::new(l2_normalize(pooled)?, true))
    } else {
        ensure_non_degenerate(&pooled)?;
        Ok(EmbeddingVector::new(pooled, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(tokens: Vec<Vec<f32>>) -> TokenOutputs {
        let dim = tokens.first().map(Vec::len).unwrap_or(0);
        TokenOutputs::from_tokens(tokens, dim).unwrap()
    }

    #[test]
    fn mean_pool_two_tokens() {
        let pooled = mean_pool(&outputs(vec![vec![1.0, 3.0], vec![3.0, 1.0]])).unwrap();
        assert_eq!(pooled, vec![2.0, 2.0]);
    }

    #[test]
    fn pool_and_normalize_two_tokens() {
        let v = pool_and_normalize(&outputs(vec![vec![1.0, 3.0], vec![3.0, 1.0]]), true).unwrap();
        assert!(v.normalized);
        assert!((v.values[0] - 0.707_106_8).abs() < 1e-6);
        assert!((v.values[1] - 0.707_106_8).abs() < 1e-6);
    }

    #[test]
    fn mean_pool_accepts_batch_dimension() {
        let out = TokenOutputs::new(vec![1, 2, 2], vec![1.0, 3.0, 3.0, 1.0]).unwrap();
        assert_eq!(mean_pool(&out).unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn mean_pool_single_token_is_identity() {
        let pooled = mean_pool(&outputs(vec![vec![0.5, -1.5, 2.0]])).unwrap();
        assert_eq!(pooled, vec![0.5, -1.5, 2.0]);
    }

    #[test]
    fn mean_pool_empty_sequence_is_degenerate() {
        let out = TokenOutputs::new(vec![0, 4], Vec::new()).unwrap();
        let err = mean_pool(&out).unwrap_err();
        assert!(matches!(err, SemanticError::DegenerateVector { dim: 4 }));
    }

    #[test]
    fn mean_pool_rejects_non_finite_values() {
        let err = mean_pool(&outputs(vec![vec![1.0, f32::NAN]])).unwrap_err();
        assert!(matches!(err, SemanticError::InvalidOutput(_)));
    }

    #[test]
    fn cancelling_tokens_are_degenerate() {
        let out = outputs(vec![vec![1.0, -2.0], vec![-1.0, 2.0]]);
        assert!(pool_and_normalize(&out, true).unwrap_err().is_degenerate());
        assert!(pool_and_normalize(&out, false).unwrap_err().is_degenerate());
    }

    #[test]
    fn pool_without_normalization_keeps_magnitude() {
        let v = pool_and_normalize(&outputs(vec![vec![3.0, 4.0], vec![3.0, 4.0]]), false).unwrap();
        assert!(!v.normalized);
        assert_eq!(v.values, vec![3.0, 4.0]);
    }

    #[test]
    fn normalized_output_has_unit_norm() {
        let tokens: Vec<Vec<f32>> = (0..7)
            .map(|t| (0..32).map(|d| ((t * 31 + d) as f32).sin()).collect())
            .collect();
        let v = pool_and_normalize(&outputs(tokens), true).unwrap();
        assert_eq!(v.dim(), 32);
        assert!((v.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn renormalizing_a_unit_vector_is_stable() {
        let v = pool_and_normalize(&outputs(vec![vec![0.6, 0.8]]), true).unwrap();
        let again = pool_and_normalize(&outputs(vec![v.values.clone()]), true).unwrap();
        for (a, b) in v.values.iter().zip(again.values.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}

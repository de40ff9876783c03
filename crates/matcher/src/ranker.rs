//! Brute-force similarity ranking over a [`CatalogIndex`].

use std::cmp::Ordering;

use index::CatalogIndex;
use semantic::{l2_norm, EmbeddingVector};

use crate::types::{MatchError, ScoredResult};

/// Catalog size from which scoring fans out over rayon (with the `parallel` feature).
pub const PARALLEL_THRESHOLD: usize = 4096;

/// Plain dot product. Equals cosine similarity when both inputs have unit norm.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity with explicit norm division, clamped to `[-1, 1]`.
///
/// Returns 0.0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let denom = l2_norm(a) * l2_norm(b);
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (dot(a, b) / denom).clamp(-1.0, 1.0)
}

/// Top-`k` catalog items by descending similarity to `query`.
///
/// Scores with a bare dot product when both the query and the index are unit
/// normalized, and with full cosine otherwise. Equal scores keep catalog order.
/// Returns at most `min(k, index.size())` results; `k == 0` yields none. A
/// query whose width differs from the index fails with
/// [`MatchError::DimensionMismatch`].
pub fn rank(
    query: &EmbeddingVector,
    index: &CatalogIndex,
    k: usize,
) -> Result<Vec<ScoredResult>, MatchError> {
    let Some(expected) = index.dimension() else {
        return Ok(Vec::new());
    };
    if query.dim() != expected {
        return Err(MatchError::DimensionMismatch {
            expected,
            found: query.dim(),
        });
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    let use_dot = query.normalized && index.normalized();
    let scores = score_all(query.as_slice(), index, use_dot);
    if let Some(position) = scores.iter().position(|s| !s.is_finite()) {
        return Err(MatchError::InvalidScore { position });
    }

    let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    if k < ranked.len() {
        ranked.select_nth_unstable_by(k - 1, by_score_then_position);
        ranked.truncate(k);
    }
    ranked.sort_unstable_by(by_score_then_position);

    Ok(ranked
        .into_iter()
        .map(|(position, score)| ScoredResult {
            item: index.items()[position].clone(),
            score,
            position,
        })
        .collect())
}

/// Descending score, then ascending position. A total order, so unstable sorts are deterministic.
fn by_score_then_position(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Score in `[-1, 1]`. f32 rounding can push a unit dot product slightly past 1.
fn score_one(query: &[f32], vector: &EmbeddingVector, use_dot: bool) -> f32 {
    if use_dot {
        dot(query, vector.as_slice()).clamp(-1.0, 1.0)
    } else {
        cosine_similarity(query, vector.as_slice())
    }
}

#[cfg(feature = "parallel")]
fn score_all(query: &[f32], index: &CatalogIndex, use_dot: bool) -> Vec<f32> {
    use rayon::prelude::*;

    if index.size() >= PARALLEL_THRESHOLD {
        index
            .vectors()
            .par_iter()
            .map(|v| score_one(query, v, use_dot))
            .collect()
    } else {
        score_sequential(query, index, use_dot)
    }
}

#[cfg(not(feature = "parallel"))]
fn score_all(query: &[f32], index: &CatalogIndex, use_dot: bool) -> Vec<f32> {
    score_sequential(query, index, use_dot)
}

fn score_sequential(query: &[f32], index: &CatalogIndex, use_dot: bool) -> Vec<f32> {
    index
        .vectors()
        .iter()
        .map(|v| score_one(query, v, use_dot))
        .collect()
}

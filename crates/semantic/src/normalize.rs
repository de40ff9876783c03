use crate::SemanticError;

/// Euclidean norm, accumulated in f64 so long vectors of small values keep precision.
pub fn l2_norm(v: &[f32]) -> f32 {
    let sum_sq: f64 = v.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    sum_sq.sqrt() as f32
}

/// Scale `v` to unit length.
///
/// Zero, NaN and infinite norms are rejected with
/// [`SemanticError::DegenerateVector`] so no NaN-filled vector can reach the
/// index or the ranker.
pub fn l2_normalize(mut v: Vec<f32>) -> Result<Vec<f32>, SemanticError> {
    l2_normalize_in_place(&mut v)?;
    Ok(v)
}

/// In-place variant of [`l2_normalize`] to keep allocations down on hot paths.
/// On error the slice is left untouched.
pub fn l2_normalize_in_place(v: &mut [f32]) -> Result<(), SemanticError> {
    let sum_sq: f64 = v.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    if !(sum_sq.is_finite() && sum_sq > 0.0) {
        return Err(SemanticError::DegenerateVector { dim: v.len() });
    }
    let inv_norm = sum_sq.sqrt().recip();
    for x in v.iter_mut() {
        *x = (f64::from(*x) * inv_norm) as f32;
    }
    Ok(())
}

/// Reject vectors that can never produce a meaningful similarity score.
pub(crate) fn ensure_non_degenerate(v: &[f32]) -> Result<(), SemanticError> {
    let norm = l2_norm(v);
    if norm.is_finite() && norm > 0.0 {
        Ok(())
    } else {
        Err(SemanticError::DegenerateVector { dim: v.len() })
    }
}

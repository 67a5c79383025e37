//! Pairwise cosine similarity for embedding vectors. Pure, no I/O.

use newsfold_common::NewsfoldError;

/// Cosine similarity between two embedding vectors, in [-1, 1].
///
/// Vectors must have identical dimensionality; a mismatch is a provider
/// misconfiguration, not a runtime condition. Returns 0.0 if either vector
/// has zero norm (degenerate embedding) — never divides by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, NewsfoldError> {
    if a.len() != b.len() {
        return Err(NewsfoldError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn identical_vectors_have_unit_similarity() {
        let v = vec![0.3, -1.2, 0.5, 2.0];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < EPS);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-0.5, 0.25, 4.0];
        let ab = cosine_similarity(&a, &b).unwrap();
        let ba = cosine_similarity(&b, &a).unwrap();
        assert!((ab - ba).abs() < EPS);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!(sim.abs() < EPS);
    }

    #[test]
    fn opposite_vectors_score_negative_one() {
        let a = vec![1.0, 1.0];
        let b = vec![-1.0, -1.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim + 1.0).abs() < EPS);
    }

    #[test]
    fn zero_norm_returns_zero_not_nan() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&b, &a).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        let err = cosine_similarity(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            NewsfoldError::DimensionMismatch { left: 2, right: 3 }
        ));
    }

    #[test]
    fn large_magnitude_vectors_do_not_overflow() {
        // Component squares exceed f32::MAX; f64 accumulation keeps the
        // result finite.
        let a = vec![3.0e19_f32, 4.0e19];
        let sim = cosine_similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < EPS);
    }

    #[test]
    fn magnitude_invariant() {
        let a = vec![1.0, 2.0, 3.0];
        let scaled: Vec<f32> = a.iter().map(|x| x * 7.5).collect();
        let sim = cosine_similarity(&a, &scaled).unwrap();
        assert!((sim - 1.0).abs() < EPS);
    }
}

// Vector math helpers shared by the profile fold and the ranker.

use ndarray::{Array1, ArrayView1};
use std::collections::HashMap;

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product = a.dot(&b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Normalize a vector to unit length. A zero vector is left untouched so a
/// cold centroid stays the zero vector instead of becoming NaN.
pub fn l2_normalize(vec: &mut Array1<f64>) {
    let norm = vec.dot(vec).sqrt();
    if norm > 0.0 {
        *vec /= norm;
    }
}

/// Dimension and finiteness check applied before an embedding enters the
/// log or the fold.
pub fn is_valid_embedding(embedding: &[f64], expected_dim: usize) -> bool {
    embedding.len() == expected_dim && embedding.iter().all(|v| v.is_finite())
}

/// Sparse dot product over vibe tags. Tags absent from either side
/// contribute nothing, so only the smaller map is walked.
pub fn vibe_dot(item_vibes: &HashMap<String, f64>, affinity: &HashMap<String, f64>) -> f64 {
    let (small, large) = if item_vibes.len() <= affinity.len() {
        (item_vibes, affinity)
    } else {
        (affinity, item_vibes)
    };

    small
        .iter()
        .filter_map(|(tag, weight)| large.get(tag).map(|other| weight * other))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = Array1::from_vec(vec![1.0, 0.0, 0.0]);
        let b = Array1::from_vec(vec![1.0, 0.0, 0.0]);
        assert!((cosine_similarity(a.view(), b.view()) - 1.0).abs() < 1e-9);

        let c = Array1::from_vec(vec![1.0, 0.0, 0.0]);
        let d = Array1::from_vec(vec![0.0, 1.0, 0.0]);
        assert!(cosine_similarity(c.view(), d.view()).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let a = Array1::from_vec(vec![0.0, 0.0]);
        let b = Array1::from_vec(vec![1.0, 0.0]);
        assert_eq!(cosine_similarity(a.view(), b.view()), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch_is_zero() {
        let a = Array1::from_vec(vec![1.0, 0.0]);
        let b = Array1::from_vec(vec![1.0, 0.0, 0.0]);
        assert_eq!(cosine_similarity(a.view(), b.view()), 0.0);
    }

    #[test]
    fn test_l2_normalize() {
        let mut vec = Array1::from_vec(vec![3.0, 4.0]);
        l2_normalize(&mut vec);
        assert!((vec[0] - 0.6).abs() < 1e-9);
        assert!((vec[1] - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_l2_normalize_zero_vector_unchanged() {
        let mut vec = Array1::from_vec(vec![0.0, 0.0, 0.0]);
        l2_normalize(&mut vec);
        assert_eq!(vec, Array1::from_vec(vec![0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_is_valid_embedding() {
        assert!(is_valid_embedding(&[0.5, -0.5], 2));
        assert!(!is_valid_embedding(&[0.5, -0.5], 3));
        assert!(!is_valid_embedding(&[0.5, f64::NAN], 2));
        assert!(!is_valid_embedding(&[0.5, f64::INFINITY], 2));
    }

    #[test]
    fn test_vibe_dot_sparse_overlap() {
        let mut item = HashMap::new();
        item.insert("minimalist".to_string(), 0.9);
        item.insert("vintage".to_string(), 0.2);

        let mut affinity = HashMap::new();
        affinity.insert("minimalist".to_string(), 0.5);
        affinity.insert("sporty".to_string(), 0.8);

        // Only minimalist overlaps
        assert!((vibe_dot(&item, &affinity) - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_vibe_dot_no_overlap_is_zero() {
        let mut item = HashMap::new();
        item.insert("vintage".to_string(), 1.0);
        let affinity = HashMap::new();
        assert_eq!(vibe_dot(&item, &affinity), 0.0);
    }
}

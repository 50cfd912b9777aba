//! Vector similarity

/// Cosine similarity of two vectors.
///
/// Returns `None` when the lengths differ and `0.0` when either vector has
/// zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Some(0.0);
    }

    Some(dot_product / (magnitude_a * magnitude_b))
}

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Cosine similarity that tolerates unnormalized and zero vectors.
#[must_use]
pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
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

/// Mean of the selected rows, or `None` when nothing is selected.
#[must_use]
pub fn mean_of_rows(rows: ArrayView2<'_, f32>, indices: &[usize]) -> Option<Array1<f32>> {
    if indices.is_empty() {
        return None;
    }
    rows.select(Axis(0), indices).mean_axis(Axis(0))
}

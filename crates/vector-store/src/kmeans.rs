//! Cosine k-means over L2-normalized rows.
//!
//! Rows and centroids are kept at unit norm, so cosine similarity is a plain
//! dot product and assignment is an argmax over `X · Cᵀ`. The loop runs a
//! fixed number of Lloyd iterations with no convergence check.

use crate::error::{Result, VectorStoreError};
use crate::tfidf::l2_normalize_rows;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ITERATIONS: usize = 20;
pub const DEFAULT_SEED: u64 = 42;

const AUTO_K_MIN: usize = 8;
const AUTO_K_MAX: usize = 64;

/// Requested number of clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterCount {
    /// `clip(floor(sqrt(max(2, n) / 2)), 8, 64)`
    #[default]
    Auto,
    Fixed(usize),
}

impl ClusterCount {
    /// Cluster count for a corpus of `n` rows, before clamping to `n`.
    #[must_use]
    pub fn resolve(self, n: usize) -> usize {
        match self {
            ClusterCount::Auto => auto_k(n),
            ClusterCount::Fixed(k) => k.max(1),
        }
    }
}

impl FromStr for ClusterCount {
    type Err = VectorStoreError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("auto") {
            return Ok(ClusterCount::Auto);
        }
        raw.parse::<usize>()
            .map(ClusterCount::Fixed)
            .map_err(|_| {
                VectorStoreError::InvalidClusterCount(format!(
                    "expected an integer or 'auto', got '{raw}'"
                ))
            })
    }
}

impl fmt::Display for ClusterCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterCount::Auto => f.write_str("auto"),
            ClusterCount::Fixed(k) => write!(f, "{k}"),
        }
    }
}

#[must_use]
pub fn auto_k(n: usize) -> usize {
    let base = (n.max(2) as f64 / 2.0).sqrt() as usize;
    base.clamp(AUTO_K_MIN, AUTO_K_MAX)
}

/// Seeded k-means++ / Lloyd clusterer.
#[derive(Debug, Clone)]
pub struct CosineKMeans {
    k: usize,
    iterations: usize,
    seed: u64,
}

impl CosineKMeans {
    #[must_use]
    pub const fn new(k: usize) -> Self {
        Self {
            k,
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cluster label for every row of `rows`.
    ///
    /// `k <= 1` labels everything 0; otherwise `k` is clamped to the row count.
    /// Empty clusters keep their previous centroid, so a cluster that loses
    /// all members in one iteration is never reseeded.
    #[must_use]
    pub fn fit_predict(&self, rows: ArrayView2<'_, f32>) -> Vec<usize> {
        let n = rows.nrows();
        if self.k <= 1 || n == 0 {
            return vec![0; n];
        }
        let k = self.k.min(n);
        let dim = rows.ncols();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = kmeans_plus_plus(rows, k, &mut rng);
        let mut labels = vec![0usize; n];

        for _ in 0..self.iterations {
            assign(rows, centroids.view(), &mut labels);

            let mut sums = Array2::<f32>::zeros((k, dim));
            let mut counts = vec![0usize; k];
            for (row, &label) in rows.outer_iter().zip(labels.iter()) {
                let mut sum = sums.row_mut(label);
                sum += &row;
                counts[label] += 1;
            }
            for (cluster, &count) in counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let scale = count as f32;
                let mean = sums.row(cluster).mapv(|v| v / scale);
                centroids.row_mut(cluster).assign(&mean);
            }
            l2_normalize_rows(&mut centroids);
        }

        log::debug!(
            "k-means finished: n={n} k={k} iterations={} seed={}",
            self.iterations,
            self.seed
        );
        labels
    }
}

fn assign(rows: ArrayView2<'_, f32>, centroids: ArrayView2<'_, f32>, labels: &mut [usize]) {
    let sims = rows.dot(&centroids.t());
    for (label, row) in labels.iter_mut().zip(sims.outer_iter()) {
        *label = argmax(row);
    }
}

/// First index of the maximum; NaN never wins.
fn argmax(values: ArrayView1<'_, f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (idx, &value) in values.iter().enumerate() {
        if value > best_value {
            best = idx;
            best_value = value;
        }
    }
    best
}

fn kmeans_plus_plus(rows: ArrayView2<'_, f32>, k: usize, rng: &mut StdRng) -> Array2<f32> {
    let n = rows.nrows();
    let mut centroids = Array2::<f32>::zeros((k, rows.ncols()));

    let first = rng.random_range(0..n);
    centroids.row_mut(0).assign(&rows.row(first));
    let mut nearest = squared_distances(rows, centroids.row(0));

    for c in 1..k {
        let idx = sample_proportional(&nearest, rng);
        centroids.row_mut(c).assign(&rows.row(idx));
        let next = squared_distances(rows, centroids.row(c));
        for (current, candidate) in nearest.iter_mut().zip(next) {
            if candidate < *current {
                *current = candidate;
            }
        }
    }

    centroids
}

fn squared_distances(rows: ArrayView2<'_, f32>, centroid: ArrayView1<'_, f32>) -> Vec<f64> {
    rows.outer_iter()
        .map(|row| {
            row.iter()
                .zip(centroid.iter())
                .map(|(a, b)| {
                    let d = f64::from(a - b);
                    d * d
                })
                .sum()
        })
        .collect()
}

/// Index drawn with probability `weights[i] / sum(weights)`.
///
/// All-zero weights (every row already sits on a centroid) fall back to a
/// uniform draw.
fn sample_proportional(weights: &[f64], rng: &mut StdRng) -> usize {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return rng.random_range(0..weights.len());
    }

    let threshold = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (idx, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = idx;
        if cumulative > threshold {
            return idx;
        }
    }
    last_positive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tfidf::HashingTfIdf;
    use ndarray::array;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn auto_k_is_clipped() {
        assert_eq!(auto_k(0), 8);
        assert_eq!(auto_k(10), 8);
        assert_eq!(auto_k(1_000), 22);
        assert_eq!(auto_k(5_000), 50);
        assert_eq!(auto_k(1_000_000), 64);
    }

    #[test]
    fn cluster_count_parses_auto_and_integers() {
        assert_eq!("auto".parse::<ClusterCount>().unwrap(), ClusterCount::Auto);
        assert_eq!(" AUTO ".parse::<ClusterCount>().unwrap(), ClusterCount::Auto);
        assert_eq!("12".parse::<ClusterCount>().unwrap(), ClusterCount::Fixed(12));
        assert!("twelve".parse::<ClusterCount>().is_err());
        assert_eq!(ClusterCount::Fixed(0).resolve(100), 1);
        assert_eq!(ClusterCount::Auto.resolve(5_000), 50);
    }

    #[test]
    fn k_of_one_or_less_labels_everything_zero() {
        let rows = array![[1.0f32, 0.0], [0.0, 1.0], [0.6, 0.8]];
        assert_eq!(CosineKMeans::new(1).fit_predict(rows.view()), vec![0, 0, 0]);
        assert_eq!(CosineKMeans::new(0).fit_predict(rows.view()), vec![0, 0, 0]);
    }

    #[test]
    fn empty_input_yields_no_labels() {
        let rows = Array2::<f32>::zeros((0, 4));
        assert!(CosineKMeans::new(3).fit_predict(rows.view()).is_empty());
    }

    #[test]
    fn k_is_clamped_to_row_count() {
        let rows = array![[1.0f32, 0.0], [0.0, 1.0]];
        let labels = CosineKMeans::new(10).fit_predict(rows.view());
        assert_eq!(labels.len(), 2);
        assert!(labels.iter().all(|&l| l < 2));
        assert_ne!(labels[0], labels[1]);
    }

    #[test]
    fn zero_rows_fall_into_cluster_zero() {
        let rows = array![[1.0f32, 0.0], [0.0, 1.0], [0.0, 0.0]];
        let labels = CosineKMeans::new(2).fit_predict(rows.view());
        assert_eq!(labels[2], 0);
    }

    #[test]
    fn separates_orthogonal_groups() {
        let mut rows = array![
            [1.0f32, 0.0, 0.0],
            [0.9999, 0.01, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.01, 0.9999],
        ];
        l2_normalize_rows(&mut rows);
        for seed in 0..8 {
            let labels = CosineKMeans::new(2).with_seed(seed).fit_predict(rows.view());
            assert_eq!(labels[0], labels[1], "seed {seed}");
            assert_eq!(labels[2], labels[3], "seed {seed}");
            assert_ne!(labels[0], labels[2], "seed {seed}");
        }
    }

    #[test]
    fn zero_iterations_keep_initial_labels() {
        let rows = array![[1.0f32, 0.0], [0.0, 1.0]];
        let labels = CosineKMeans::new(2)
            .with_iterations(0)
            .fit_predict(rows.view());
        assert_eq!(labels, vec![0, 0]);
    }

    #[test]
    fn empty_cluster_is_left_unused() {
        // three copies of one row: seeding runs out of distinct points and
        // the third centroid duplicates an earlier one, so it never wins a row
        let rows = array![[1.0f32, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        for seed in 0..16 {
            let model = CosineKMeans::new(3).with_seed(seed);
            let labels = model.fit_predict(rows.view());
            assert!(labels.iter().all(|&l| l < 2), "seed {seed}: {labels:?}");
            assert_eq!(labels[0], labels[1], "seed {seed}");
            assert_eq!(labels[1], labels[2], "seed {seed}");
            assert_ne!(labels[0], labels[3], "seed {seed}");
            assert_eq!(model.fit_predict(rows.view()), labels, "seed {seed}");
        }
    }

    #[test]
    fn sampling_skips_zero_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            assert_eq!(sample_proportional(&[0.0, 0.0, 3.0, 0.0], &mut rng), 2);
        }
        let idx = sample_proportional(&[0.0, 0.0], &mut rng);
        assert!(idx < 2);
    }

    #[test]
    fn similar_instructions_usually_share_a_cluster() {
        let docs = [
            "write a sorting function",
            "explain quantum physics",
            "write a function to sort",
        ];
        let rows = HashingTfIdf::new(64).unwrap().fit_transform(&docs);
        let together = (0..20)
            .filter(|&seed| {
                let labels = CosineKMeans::new(2).with_seed(seed).fit_predict(rows.view());
                labels[0] == labels[2]
            })
            .count();
        assert!(together >= 10, "together in only {together}/20 seeds");
    }

    fn normalized_rows(raw: Vec<f32>, n: usize, dim: usize) -> Array2<f32> {
        let mut rows = Array2::from_shape_vec((n, dim), raw[..n * dim].to_vec()).unwrap();
        l2_normalize_rows(&mut rows);
        rows
    }

    proptest! {
        #[test]
        fn labels_cover_every_row_within_range(
            seed in any::<u64>(),
            dim in 1usize..12,
            n in 1usize..40,
            k in 1usize..12,
            raw in proptest::collection::vec(-1.0f32..1.0f32, 12 * 40),
        ) {
            prop_assume!(k <= n);
            let rows = normalized_rows(raw, n, dim);
            let labels = CosineKMeans::new(k).with_seed(seed).fit_predict(rows.view());
            prop_assert_eq!(labels.len(), n);
            prop_assert!(labels.iter().all(|&l| l < k));
        }

        #[test]
        fn same_seed_gives_same_labels(
            seed in any::<u64>(),
            n in 2usize..30,
            k in 2usize..8,
            raw in proptest::collection::vec(-1.0f32..1.0f32, 8 * 30),
        ) {
            let rows = normalized_rows(raw, n, 8);
            let model = CosineKMeans::new(k).with_seed(seed).with_iterations(5);
            prop_assert_eq!(model.fit_predict(rows.view()), model.fit_predict(rows.view()));
        }
    }
}

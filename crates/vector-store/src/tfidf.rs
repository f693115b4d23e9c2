use crate::error::{Result, VectorStoreError};
use crate::hashing::bucket_of;
use crate::tokenizer::tokenize;
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_DIM: usize = 4096;

/// Divisor floor for row normalization; zero rows stay zero.
pub const ROW_NORM_EPS: f32 = 1e-12;

/// Stateless TF-IDF over hashed token buckets.
///
/// No vocabulary is kept: every token lands in `fnv1a(token) % dim`, so the
/// output width is fixed up front and collisions are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingTfIdf {
    dim: usize,
}

impl HashingTfIdf {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(VectorStoreError::InvalidConfig(
                "hashing dimension must be > 0".to_string(),
            ));
        }
        Ok(Self { dim })
    }

    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Build the `N×dim` matrix for `documents`, one L2-normalized row each.
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> Array2<f32> {
        let n = documents.len();
        let buckets: Vec<Vec<usize>> = documents
            .iter()
            .map(|doc| {
                tokenize(doc.as_ref())
                    .iter()
                    .map(|tok| bucket_of(tok, self.dim))
                    .collect()
            })
            .collect();

        let mut df = vec![0u32; self.dim];
        for doc in &buckets {
            let unique: BTreeSet<usize> = doc.iter().copied().collect();
            for b in unique {
                df[b] += 1;
            }
        }

        let n_smooth = 1.0 + n as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| (n_smooth / (1.0 + f64::from(d))).ln() + 1.0)
            .collect();

        let mut matrix = Array2::<f32>::zeros((n, self.dim));
        for (row_idx, doc) in buckets.iter().enumerate() {
            if doc.is_empty() {
                continue;
            }
            let mut tf: BTreeMap<usize, u32> = BTreeMap::new();
            for &b in doc {
                *tf.entry(b).or_insert(0) += 1;
            }
            let mut row = matrix.row_mut(row_idx);
            for (b, count) in tf {
                row[b] = (f64::from(count).ln_1p() * idf[b]) as f32;
            }
        }

        l2_normalize_rows(&mut matrix);
        log::debug!("Vectorized {n} documents into {} hashed buckets", self.dim);
        matrix
    }
}

impl Default for HashingTfIdf {
    fn default() -> Self {
        Self { dim: DEFAULT_DIM }
    }
}

/// Scale every row to unit L2 norm in place.
pub fn l2_normalize_rows(matrix: &mut Array2<f32>) {
    for mut row in matrix.rows_mut() {
        let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt().max(ROW_NORM_EPS);
        row.mapv_inplace(|v| v / norm);
    }
}

//! # Pairs Vector Store
//!
//! Offline feature extraction and topic clustering for instruction/response
//! pairs.
//!
//! ## Pipeline
//!
//! ```text
//! documents
//!     │
//!     ├──> Tokenizer ([A-Za-z0-9_]+, lowercased)
//!     │
//!     ├──> Hashing trick (fnv1a % dim)
//!     │      └─> df / idf per bucket
//!     │
//!     ├──> log-TF × IDF, L2-normalized rows
//!     │
//!     └──> Cosine k-means (k-means++ seed, fixed Lloyd iterations)
//!            └─> one label per document
//! ```
//!
//! ## Example
//!
//! ```
//! use pairs_vector_store::{ClusterCount, CosineKMeans, HashingTfIdf};
//!
//! # fn main() -> pairs_vector_store::Result<()> {
//! let docs = ["write a sorting function", "explain quantum physics"];
//! let rows = HashingTfIdf::new(64)?.fit_transform(&docs);
//! let k = ClusterCount::Fixed(2).resolve(docs.len());
//! let labels = CosineKMeans::new(k).with_seed(42).fit_predict(rows.view());
//! assert_eq!(labels.len(), 2);
//! # Ok(())
//! # }
//! ```

mod error;
mod hashing;
mod kmeans;
mod similarity;
mod tfidf;
mod tokenizer;

pub use error::{Result, VectorStoreError};
pub use hashing::bucket_of;
pub use kmeans::{auto_k, ClusterCount, CosineKMeans, DEFAULT_ITERATIONS, DEFAULT_SEED};
pub use similarity::{cosine_similarity, mean_of_rows};
pub use tfidf::{l2_normalize_rows, HashingTfIdf, DEFAULT_DIM, ROW_NORM_EPS};
pub use tokenizer::{count_whitespace_tokens, tokenize};

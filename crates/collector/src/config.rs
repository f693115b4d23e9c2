use crate::error::{CollectorError, Result};
use pairs_vector_store::{ClusterCount, DEFAULT_DIM, DEFAULT_ITERATIONS, DEFAULT_SEED};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hard cap on either side of a pair, in characters.
pub const DEFAULT_MAX_CHARS: usize = 8000;

/// Below this many surviving pairs the collection is rerun with relaxed bounds.
pub const DEFAULT_MIN_PAIRS: usize = 1000;

/// Configuration for one dataset build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Minimum whitespace-token count for instruction and response
    pub min_len: usize,

    /// Maximum whitespace-token count for instruction and response
    pub max_len: usize,

    /// Maximum character count for instruction and response
    pub max_chars: usize,

    /// Number of pairs to collect before stopping
    pub target: usize,

    /// Maximum raw pairs requested from a single source
    pub per_source_cap: usize,

    /// Relaxation threshold
    pub min_pairs: usize,

    /// Hashing TF-IDF width
    pub dim: usize,

    /// Cluster count, integer or "auto"
    #[serde(
        serialize_with = "serialize_cluster_count",
        deserialize_with = "deserialize_cluster_count"
    )]
    pub k: ClusterCount,

    /// Lloyd iterations
    pub iterations: usize,

    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_len: 5,
            max_len: 512,
            max_chars: DEFAULT_MAX_CHARS,
            target: 5000,
            per_source_cap: 20_000,
            min_pairs: DEFAULT_MIN_PAIRS,
            dim: DEFAULT_DIM,
            k: ClusterCount::Auto,
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_len > self.max_len {
            return Err(CollectorError::invalid_config(format!(
                "min_len ({}) cannot exceed max_len ({})",
                self.min_len, self.max_len
            )));
        }
        if self.dim == 0 {
            return Err(CollectorError::invalid_config("dim must be > 0"));
        }
        if self.max_chars == 0 {
            return Err(CollectorError::invalid_config("max_chars must be > 0"));
        }
        Ok(())
    }

    #[must_use]
    pub const fn bounds(&self) -> CollectBounds {
        CollectBounds {
            min_len: self.min_len,
            max_len: self.max_len,
            max_chars: self.max_chars,
            target: self.target,
            per_source_cap: self.per_source_cap,
        }
    }

    /// Bounds for the second collection pass when the first one came up short.
    #[must_use]
    pub fn relaxed_bounds(&self) -> CollectBounds {
        CollectBounds {
            min_len: (self.min_len / 2).max(1),
            max_len: self.max_len.saturating_mul(2),
            max_chars: self.max_chars,
            target: self.target.max(self.min_pairs),
            per_source_cap: self.per_source_cap.saturating_mul(2),
        }
    }
}

/// Limits applied during one collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectBounds {
    pub min_len: usize,
    pub max_len: usize,
    pub max_chars: usize,
    pub target: usize,
    pub per_source_cap: usize,
}

fn serialize_cluster_count<S: Serializer>(
    value: &ClusterCount,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        ClusterCount::Auto => serializer.serialize_str("auto"),
        ClusterCount::Fixed(k) => serializer.serialize_u64(*k as u64),
    }
}

fn deserialize_cluster_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<ClusterCount, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Count(usize),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Count(k) => Ok(ClusterCount::Fixed(k)),
        Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

use anyhow::Result;
use ndarray::Array2;
use pairs_protocol::DatasetRecord;
use pairs_vector_store::{
    cosine_similarity, mean_of_rows, CosineKMeans, HashingTfIdf, DEFAULT_DIM, DEFAULT_ITERATIONS,
    DEFAULT_SEED,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Upper bound on the re-clustering k when none is given.
const RECLUSTER_MAX_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub dim: usize,
    /// Re-cluster even when every record already carries a label
    pub recluster: bool,
    /// Defaults to `min(10, distinct sources, records)`
    pub k: Option<usize>,
    pub seed: u64,
    pub iterations: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            recluster: false,
            k: None,
            seed: DEFAULT_SEED,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl AnalyzeOptions {
    #[must_use]
    pub fn with_dim(dim: usize) -> Self {
        Self {
            dim,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub cluster: i64,
    pub size: usize,
    pub sources: BTreeMap<String, usize>,
    pub intents: BTreeMap<String, usize>,
    pub top_source: Option<String>,
    pub top_intent: Option<String>,
    /// Input of the first record in the cluster
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAnalysis {
    /// Labels were computed here rather than read from the dataset
    pub reclustered: bool,
    pub clusters: Vec<ClusterProfile>,
    /// Number of clusters each pair of sources shares
    pub overlap: BTreeMap<String, BTreeMap<String, usize>>,
    /// Each unordered source pair counted once
    pub total_overlaps: usize,
    /// Cosine between per-source mean TF-IDF vectors
    pub similarity: BTreeMap<String, BTreeMap<String, f32>>,
}

/// Profiles clusters and compares sources.
///
/// Records without cluster labels (all negative) are re-clustered with
/// hashing TF-IDF and cosine k-means over `input + " " + output`, as is
/// every dataset when `options.recluster` is set.
pub fn analyze(records: &[DatasetRecord], options: &AnalyzeOptions) -> Result<ClusterAnalysis> {
    let texts: Vec<String> = records
        .iter()
        .map(|record| format!("{} {}", record.input, record.output))
        .collect();
    let rows = HashingTfIdf::new(options.dim)?.fit_transform(&texts);

    let unlabeled = records.iter().all(|record| record.cluster < 0);
    let reclustered = !records.is_empty() && (options.recluster || unlabeled);
    let labels: Vec<i64> = if reclustered {
        let k = options.k.unwrap_or_else(|| default_k(records));
        log::info!("Re-clustering {} records with k={k}", records.len());
        CosineKMeans::new(k)
            .with_seed(options.seed)
            .with_iterations(options.iterations)
            .fit_predict(rows.view())
            .into_iter()
            .map(|label| label as i64)
            .collect()
    } else {
        records.iter().map(|record| record.cluster).collect()
    };

    let clusters = profile_clusters(records, &labels);

    let mut overlap: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    let mut total_overlaps = 0usize;
    for profile in &clusters {
        let names: Vec<&String> = profile.sources.keys().collect();
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                *overlap
                    .entry((*a).clone())
                    .or_default()
                    .entry((*b).clone())
                    .or_insert(0) += 1;
                *overlap
                    .entry((*b).clone())
                    .or_default()
                    .entry((*a).clone())
                    .or_insert(0) += 1;
                total_overlaps += 1;
            }
        }
    }

    let similarity = source_similarity(records, &rows);

    Ok(ClusterAnalysis {
        reclustered,
        clusters,
        overlap,
        total_overlaps,
        similarity,
    })
}

fn default_k(records: &[DatasetRecord]) -> usize {
    let sources: BTreeSet<&str> = records.iter().map(|record| record.source.as_str()).collect();
    RECLUSTER_MAX_K.min(sources.len()).min(records.len())
}

fn profile_clusters(records: &[DatasetRecord], labels: &[i64]) -> Vec<ClusterProfile> {
    let mut by_cluster: BTreeMap<i64, Vec<&DatasetRecord>> = BTreeMap::new();
    for (record, &label) in records.iter().zip(labels) {
        by_cluster.entry(label).or_default().push(record);
    }

    by_cluster
        .into_iter()
        .map(|(cluster, members)| {
            let mut sources = BTreeMap::new();
            let mut intents = BTreeMap::new();
            for record in &members {
                *sources.entry(record.source.clone()).or_insert(0usize) += 1;
                *intents.entry(record.intent.clone()).or_insert(0usize) += 1;
            }
            ClusterProfile {
                cluster,
                size: members.len(),
                top_source: most_common(&sources),
                top_intent: most_common(&intents),
                sources,
                intents,
                example: members.first().map(|record| record.input.clone()),
            }
        })
        .collect()
}

/// Highest count; ties go to the name that sorts first.
fn most_common(counts: &BTreeMap<String, usize>) -> Option<String> {
    counts
        .iter()
        .fold(None::<(&String, usize)>, |best, (name, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((name, count)),
        })
        .map(|(name, _)| name.clone())
}

fn source_similarity(
    records: &[DatasetRecord],
    rows: &Array2<f32>,
) -> BTreeMap<String, BTreeMap<String, f32>> {
    let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, record) in records.iter().enumerate() {
        members.entry(record.source.as_str()).or_default().push(idx);
    }
    let centroids: Vec<(&str, _)> = members
        .iter()
        .filter_map(|(source, indices)| {
            mean_of_rows(rows.view(), indices).map(|centroid| (*source, centroid))
        })
        .collect();

    let mut matrix: BTreeMap<String, BTreeMap<String, f32>> = BTreeMap::new();
    for (a, centroid_a) in &centroids {
        let row = matrix.entry((*a).to_string()).or_default();
        for (b, centroid_b) in &centroids {
            let value = if a == b {
                1.0
            } else {
                cosine_similarity(centroid_a.view(), centroid_b.view())
            };
            row.insert((*b).to_string(), value);
        }
    }
    matrix
}

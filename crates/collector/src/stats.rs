use pairs_protocol::{AnnotatedPair, Intent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters for one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectStats {
    /// Raw pairs read from sources
    pub read: usize,

    /// Pairs kept, by source name
    pub kept: BTreeMap<String, usize>,

    /// Pairs rejected by the length filter, by reason
    pub rejected: BTreeMap<String, usize>,

    /// Pairs dropped as duplicates
    pub duplicates: usize,

    /// Sources that could not be opened
    pub failed_sources: Vec<String>,

    /// Sources that opened but had every pair filtered out or duplicated
    pub empty_sources: Vec<String>,
}

impl CollectStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_kept(&mut self, source: &str) {
        *self.kept.entry(source.to_string()).or_insert(0) += 1;
    }

    pub fn add_rejected(&mut self, reason: &str) {
        *self.rejected.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn add_failed_source(&mut self, source: &str) {
        push_unique(&mut self.failed_sources, source);
    }

    pub fn add_empty_source(&mut self, source: &str) {
        push_unique(&mut self.empty_sources, source);
    }

    #[must_use]
    pub fn successful_sources(&self) -> usize {
        self.kept.values().filter(|count| **count > 0).count()
    }

    #[must_use]
    pub fn total_kept(&self) -> usize {
        self.kept.values().sum()
    }

    /// Fold the counters of a later pass into this one.
    pub fn absorb(&mut self, other: &CollectStats) {
        self.read += other.read;
        for (source, count) in &other.kept {
            *self.kept.entry(source.clone()).or_insert(0) += count;
        }
        for (reason, count) in &other.rejected {
            *self.rejected.entry(reason.clone()).or_insert(0) += count;
        }
        self.duplicates += other.duplicates;
        for source in &other.failed_sources {
            push_unique(&mut self.failed_sources, source);
        }
        for source in &other.empty_sources {
            push_unique(&mut self.empty_sources, source);
        }
        // a relaxed pass may rescue a source that was empty before
        let kept = &self.kept;
        self.empty_sources
            .retain(|source| !kept.get(source).is_some_and(|count| *count > 0));
    }
}

fn push_unique(list: &mut Vec<String>, source: &str) {
    if !list.iter().any(|existing| existing == source) {
        list.push(source.to_string());
    }
}

/// Outcome of a full build, reported on stderr and via `--summary-json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub pairs: usize,

    /// Cluster count actually used
    pub k: usize,

    pub dim: usize,

    /// Whether the relaxed second pass ran
    pub relaxed: bool,

    pub elapsed_ms: u64,

    pub intents: BTreeMap<Intent, usize>,

    pub sources: BTreeMap<String, usize>,

    pub collection: CollectStats,
}

impl BuildSummary {
    /// Fills the distributions from the annotated pairs.
    pub fn record_pairs(&mut self, pairs: &[AnnotatedPair]) {
        self.pairs = pairs.len();
        self.intents.clear();
        self.sources.clear();
        for annotated in pairs {
            *self.intents.entry(annotated.intent).or_insert(0) += 1;
            *self.sources.entry(annotated.pair.source.clone()).or_insert(0) += 1;
        }
    }

    /// Intents by descending count, then by name.
    #[must_use]
    pub fn intent_ranking(&self) -> Vec<(Intent, usize)> {
        let mut ranking: Vec<_> = self.intents.iter().map(|(i, c)| (*i, *c)).collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        ranking
    }

    /// One-line distribution, e.g. `code:12, qa:7`.
    #[must_use]
    pub fn intent_line(&self) -> String {
        self.intent_ranking()
            .iter()
            .map(|(intent, count)| format!("{intent}:{count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

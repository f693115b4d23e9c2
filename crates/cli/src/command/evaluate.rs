use pairs_protocol::{DatasetRecord, Intent};
use pairs_vector_store::count_whitespace_tokens;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source count at which coverage saturates.
const EXPECTED_SOURCES: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthStats {
    pub min: usize,
    pub max: usize,
    pub avg: f64,
}

impl LengthStats {
    fn from_lengths(lengths: &[usize]) -> Self {
        if lengths.is_empty() {
            return Self {
                min: 0,
                max: 0,
                avg: 0.0,
            };
        }
        Self {
            min: lengths.iter().copied().min().unwrap_or_default(),
            max: lengths.iter().copied().max().unwrap_or_default(),
            avg: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Distinct intents over the number of known intents
    pub diversity_score: f64,
    /// Smallest intent count over the largest
    pub balance_score: f64,
    /// Distinct sources over ten
    pub coverage_score: f64,
    /// Distinct clusters over record count
    pub cluster_efficiency: f64,
}

impl QualityMetrics {
    #[must_use]
    pub fn overall(&self) -> f64 {
        (self.diversity_score + self.balance_score + self.coverage_score + self.cluster_efficiency)
            / 4.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Verdict {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Verdict::Excellent
        } else if score >= 0.6 {
            Verdict::Good
        } else if score >= 0.4 {
            Verdict::Fair
        } else {
            Verdict::Poor
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Verdict::Excellent => "excellent",
            Verdict::Good => "good",
            Verdict::Fair => "fair",
            Verdict::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEvaluation {
    pub total_pairs: usize,
    pub sources: BTreeMap<String, usize>,
    pub intents: BTreeMap<String, usize>,
    pub clusters: BTreeMap<i64, usize>,
    pub input_length: LengthStats,
    pub output_length: LengthStats,
    pub quality_metrics: QualityMetrics,
    pub overall_score: f64,
    pub verdict: Verdict,
}

pub fn evaluate(records: &[DatasetRecord]) -> DatasetEvaluation {
    let mut sources = BTreeMap::new();
    let mut intents = BTreeMap::new();
    let mut clusters = BTreeMap::new();
    let mut input_lengths = Vec::with_capacity(records.len());
    let mut output_lengths = Vec::with_capacity(records.len());

    for record in records {
        *sources.entry(record.source.clone()).or_insert(0usize) += 1;
        *intents.entry(record.intent.clone()).or_insert(0usize) += 1;
        *clusters.entry(record.cluster).or_insert(0usize) += 1;
        input_lengths.push(count_whitespace_tokens(&record.input));
        output_lengths.push(count_whitespace_tokens(&record.output));
    }

    let balance_score = match (intents.values().min(), intents.values().max()) {
        (Some(&min), Some(&max)) if max > 0 => min as f64 / max as f64,
        _ => 0.0,
    };
    let cluster_efficiency = if records.is_empty() {
        0.0
    } else {
        clusters.len() as f64 / records.len() as f64
    };
    let quality_metrics = QualityMetrics {
        diversity_score: intents.len() as f64 / Intent::ALL.len() as f64,
        balance_score,
        coverage_score: sources.len() as f64 / EXPECTED_SOURCES,
        cluster_efficiency,
    };
    let overall_score = quality_metrics.overall();

    DatasetEvaluation {
        total_pairs: records.len(),
        sources,
        intents,
        clusters,
        input_length: LengthStats::from_lengths(&input_lengths),
        output_length: LengthStats::from_lengths(&output_lengths),
        quality_metrics,
        overall_score,
        verdict: Verdict::from_score(overall_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(source: &str, intent: &str, cluster: i64, input: &str, output: &str) -> DatasetRecord {
        DatasetRecord {
            id: None,
            source: source.to_string(),
            input: input.to_string(),
            output: output.to_string(),
            intent: intent.to_string(),
            cluster,
        }
    }

    #[test]
    fn counts_lengths_and_metrics() {
        let records = vec![
            record("alpaca", "code", 0, "write a function", "def f(): pass"),
            record("alpaca", "code", 1, "fix this bug", "done"),
            record("dolly", "qa", 0, "what is rust", "a language that is fast"),
            record("dolly", "qa", 0, "who are you", "an assistant"),
        ];
        let eval = evaluate(&records);

        assert_eq!(eval.total_pairs, 4);
        assert_eq!(eval.sources.get("dolly"), Some(&2));
        assert_eq!(eval.clusters.get(&0), Some(&3));
        assert_eq!(eval.input_length.min, 3);
        assert_eq!(eval.input_length.max, 3);
        assert_eq!(eval.output_length.min, 1);
        assert_eq!(eval.output_length.max, 5);
        assert!((eval.output_length.avg - 2.75).abs() < 1e-9);

        let metrics = eval.quality_metrics;
        assert!((metrics.diversity_score - 0.2).abs() < 1e-9);
        assert!((metrics.balance_score - 1.0).abs() < 1e-9);
        assert!((metrics.coverage_score - 0.2).abs() < 1e-9);
        assert!((metrics.cluster_efficiency - 0.5).abs() < 1e-9);
        assert!((eval.overall_score - 0.475).abs() < 1e-9);
        assert_eq!(eval.verdict, Verdict::Fair);
    }

    #[test]
    fn empty_dataset_scores_zero() {
        let eval = evaluate(&[]);
        assert_eq!(eval.total_pairs, 0);
        assert_eq!(eval.input_length.max, 0);
        assert_eq!(eval.overall_score, 0.0);
        assert_eq!(eval.verdict, Verdict::Poor);
    }

    #[test]
    fn verdict_bands() {
        assert_eq!(Verdict::from_score(0.8), Verdict::Excellent);
        assert_eq!(Verdict::from_score(0.79), Verdict::Good);
        assert_eq!(Verdict::from_score(0.6), Verdict::Good);
        assert_eq!(Verdict::from_score(0.4), Verdict::Fair);
        assert_eq!(Verdict::from_score(0.39), Verdict::Poor);
    }
}

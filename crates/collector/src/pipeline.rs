use crate::collect::collect_with_relaxation;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::intent::IntentClassifier;
use crate::source::PairSource;
use crate::stats::BuildSummary;
use pairs_protocol::{AnnotatedPair, InstructionPair, OutputRecord};
use pairs_vector_store::{CosineKMeans, HashingTfIdf};
use std::collections::BTreeMap;
use std::time::Instant;

/// Records ready to write, plus the run summary.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub records: Vec<OutputRecord>,
    pub summary: BuildSummary,
}

/// Collect → tag intents → vectorize → cluster → emit.
pub struct PairPipeline {
    config: PipelineConfig,
    vectorizer: HashingTfIdf,
}

impl PairPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let vectorizer = HashingTfIdf::new(config.dim)?;
        Ok(Self { config, vectorizer })
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, sources: &[Box<dyn PairSource>]) -> Result<BuildOutput> {
        let start = Instant::now();
        log::info!("Collecting from {} sources", sources.len());

        let collection = collect_with_relaxation(sources, &self.config);
        let (annotated, k) = self.annotate(collection.pairs);

        let records: Vec<OutputRecord> = annotated
            .iter()
            .enumerate()
            .map(|(position, pair)| OutputRecord::from_annotated(position, pair))
            .collect();

        let mut summary = BuildSummary {
            pairs: 0,
            k,
            dim: self.config.dim,
            relaxed: collection.relaxed,
            elapsed_ms: 0,
            intents: BTreeMap::new(),
            sources: BTreeMap::new(),
            collection: collection.stats,
        };
        summary.record_pairs(&annotated);
        summary.elapsed_ms = start.elapsed().as_millis() as u64;

        log::info!(
            "Done: {} pairs | k={} | dim={} | time={:.1}s",
            summary.pairs,
            summary.k,
            summary.dim,
            summary.elapsed_ms as f64 / 1000.0
        );
        log::info!("Intent distribution: {}", summary.intent_line());

        Ok(BuildOutput { records, summary })
    }

    /// Tags every pair with its intent and cluster label.
    ///
    /// Returns the pairs in input order and the requested cluster count.
    pub fn annotate(&self, pairs: Vec<InstructionPair>) -> (Vec<AnnotatedPair>, usize) {
        let texts: Vec<String> = pairs.iter().map(InstructionPair::cluster_text).collect();
        let rows = self.vectorizer.fit_transform(&texts);

        let k = self.config.k.resolve(pairs.len());
        log::debug!("Clustering {} rows into k={k}", pairs.len());
        let labels = CosineKMeans::new(k)
            .with_iterations(self.config.iterations)
            .with_seed(self.config.seed)
            .fit_predict(rows.view());

        let annotated = pairs
            .into_iter()
            .zip(labels)
            .map(|(pair, cluster)| AnnotatedPair {
                intent: IntentClassifier::classify_pair(&pair),
                pair,
                cluster,
            })
            .collect();
        (annotated, k)
    }
}

//! # Pairs Collector
//!
//! Builds a labeled instruction dataset from local pair sources.
//!
//! ## Pipeline
//!
//! ```text
//! Sources (JSON / JSONL, in order)
//!     │
//!     ├──> Length filter (whitespace tokens, 8000 chars)
//!     │
//!     ├──> Dedup (keyed BLAKE3 of instruction + response)
//!     │      └─> relaxed second pass when too few survive
//!     │
//!     ├──> Intent rules (first match wins)
//!     │
//!     ├──> Hashing TF-IDF + cosine k-means
//!     │
//!     └──> JSONL records (`source::position` ids)
//! ```
//!
//! ## Example
//!
//! ```
//! use pairs_collector::{MemorySource, PairPipeline, PairSource, PipelineConfig, RawPair};
//!
//! # fn main() -> pairs_collector::Result<()> {
//! let sources: Vec<Box<dyn PairSource>> = vec![Box::new(MemorySource::new(
//!     "notes",
//!     vec![RawPair::new("Write a haiku about rust", "Orange flakes drift down")],
//! ))];
//! let config = PipelineConfig {
//!     min_len: 1,
//!     min_pairs: 1,
//!     ..Default::default()
//! };
//! let output = PairPipeline::new(config)?.run(&sources)?;
//! assert_eq!(output.records[0].id, "notes::0");
//! # Ok(())
//! # }
//! ```

mod collect;
mod config;
mod dedup;
mod error;
mod file_source;
mod filter;
mod intent;
mod output;
mod pipeline;
mod scanner;
mod source;
mod stats;

pub use collect::{collect, collect_with_relaxation, Collection};
pub use config::{CollectBounds, PipelineConfig, DEFAULT_MAX_CHARS, DEFAULT_MIN_PAIRS};
pub use dedup::{stable_pair_hash, Deduplicator, PAIR_SEPARATOR};
pub use error::{CollectorError, Result};
pub use file_source::{normalize_record, FileSource};
pub use filter::{LengthFilter, RejectReason};
pub use intent::IntentClassifier;
pub use output::{write_records, OutputFormat};
pub use pipeline::{BuildOutput, PairPipeline};
pub use scanner::{open_sources, SourceScanner, SourceSpec};
pub use source::{MemorySource, PairIter, PairSource, RawPair};
pub use stats::{BuildSummary, CollectStats};

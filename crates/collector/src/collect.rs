use crate::config::{CollectBounds, PipelineConfig};
use crate::dedup::Deduplicator;
use crate::filter::LengthFilter;
use crate::source::{PairSource, RawPair};
use crate::stats::CollectStats;
use pairs_protocol::InstructionPair;

/// Pairs surviving one or more collection passes, in collection order.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub pairs: Vec<InstructionPair>,
    pub stats: CollectStats,
    pub relaxed: bool,
}

/// One pass over `sources` in order, stopping at `bounds.target` pairs.
///
/// A source that fails to open is logged and contributes nothing.
pub fn collect(sources: &[Box<dyn PairSource>], bounds: &CollectBounds) -> Collection {
    let filter = LengthFilter::new(bounds);
    let mut seen = Deduplicator::new();
    let mut stats = CollectStats::new();
    let mut pairs: Vec<InstructionPair> = Vec::new();

    for source in sources {
        if pairs.len() >= bounds.target {
            break;
        }
        let take = bounds.per_source_cap.min(bounds.target - pairs.len());
        let name = source.name();
        log::info!("Trying {name} (take {take})");

        let iter = match source.pairs(take) {
            Ok(iter) => iter,
            Err(err) => {
                log::warn!("{name}: failed to open: {err}");
                stats.add_failed_source(name);
                continue;
            }
        };

        let mut kept = 0usize;
        for raw in iter {
            stats.read += 1;
            let pair = normalize(name, raw);
            if let Err(reason) = filter.check(&pair.instruction, &pair.response) {
                stats.add_rejected(reason.as_str());
                continue;
            }
            if !seen.insert(&pair.instruction, &pair.response) {
                stats.duplicates += 1;
                continue;
            }
            stats.add_kept(name);
            pairs.push(pair);
            kept += 1;
            if pairs.len() >= bounds.target {
                break;
            }
        }

        if kept > 0 {
            log::info!("{name}: {kept} pairs");
        } else {
            log::warn!("{name}: no usable pairs");
            stats.add_empty_source(name);
        }
    }

    log::info!(
        "Collected {} pairs from {} sources",
        pairs.len(),
        stats.successful_sources()
    );
    Collection {
        pairs,
        stats,
        relaxed: false,
    }
}

/// Collect with the configured bounds, retrying once with relaxed bounds
/// when fewer than `min_pairs` survive.
///
/// The retry is an independent pass; its pairs not already present are
/// appended after the first pass's pairs.
pub fn collect_with_relaxation(
    sources: &[Box<dyn PairSource>],
    config: &PipelineConfig,
) -> Collection {
    let mut collection = collect(sources, &config.bounds());
    if collection.pairs.len() >= config.min_pairs {
        return collection;
    }

    log::warn!(
        "Only got {} pairs, retrying with relaxed filters",
        collection.pairs.len()
    );
    let more = collect(sources, &config.relaxed_bounds());
    let added = merge_unique(&mut collection.pairs, more.pairs);
    collection.stats.absorb(&more.stats);
    collection.relaxed = true;
    log::info!("Relaxed pass added {added} pairs");

    if collection.pairs.len() < config.min_pairs {
        log::warn!(
            "Collected only {} pairs (< {}); sources may be missing or too small",
            collection.pairs.len(),
            config.min_pairs
        );
    }
    collection
}

/// Appends pairs whose (instruction, response) is not already in `pairs`.
fn merge_unique(pairs: &mut Vec<InstructionPair>, more: Vec<InstructionPair>) -> usize {
    let mut seen = Deduplicator::new();
    for pair in pairs.iter() {
        seen.insert(&pair.instruction, &pair.response);
    }
    let before = pairs.len();
    for pair in more {
        if seen.insert(&pair.instruction, &pair.response) {
            pairs.push(pair);
        }
    }
    pairs.len() - before
}

fn normalize(source: &str, raw: RawPair) -> InstructionPair {
    let context = raw
        .context
        .map(|context| context.trim().to_string())
        .filter(|context| !context.is_empty());
    InstructionPair::new(
        source,
        raw.instruction.trim(),
        context,
        raw.response.trim(),
    )
}

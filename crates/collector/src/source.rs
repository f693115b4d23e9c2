use crate::error::Result;
use serde::{Deserialize, Serialize};

/// An unlabeled `{instruction, response, context?}` triple as a source yields it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPair {
    pub instruction: String,
    pub context: Option<String>,
    pub response: String,
}

impl RawPair {
    pub fn new(instruction: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            context: None,
            response: response.into(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

pub type PairIter<'a> = Box<dyn Iterator<Item = RawPair> + 'a>;

/// Upstream provider of raw pairs.
///
/// `pairs` is lazy and yields at most `max_take` items. An `Err` means the
/// source could not be reached at all; the collector logs it and moves on.
pub trait PairSource {
    fn name(&self) -> &str;

    fn pairs(&self, max_take: usize) -> Result<PairIter<'_>>;
}

/// In-process source over an owned list of pairs.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    pairs: Vec<RawPair>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, pairs: Vec<RawPair>) -> Self {
        Self {
            name: name.into(),
            pairs,
        }
    }
}

impl PairSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn pairs(&self, max_take: usize) -> Result<PairIter<'_>> {
        Ok(Box::new(self.pairs.iter().take(max_take).cloned()))
    }
}

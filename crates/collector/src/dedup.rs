use std::collections::HashSet;

/// Joins instruction and response before hashing.
pub const PAIR_SEPARATOR: &str = "\n###\n";

const DEDUP_KEY: [u8; 32] = *b"instruct-pairs stable pair hash!";

/// 64-bit keyed BLAKE3 digest of `instruction + "\n###\n" + response`.
///
/// Stable across runs and platforms; collisions are accepted at dataset scale.
#[must_use]
pub fn stable_pair_hash(instruction: &str, response: &str) -> u64 {
    let mut hasher = blake3::Hasher::new_keyed(&DEDUP_KEY);
    hasher.update(instruction.as_bytes());
    hasher.update(PAIR_SEPARATOR.as_bytes());
    hasher.update(response.as_bytes());
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_be_bytes(head)
}

/// Remembers which pairs were already emitted.
#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    seen: HashSet<u64>,
}

impl Deduplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` the first time a pair is offered, `false` for repeats.
    pub fn insert(&mut self, instruction: &str, response: &str) -> bool {
        self.seen.insert(stable_pair_hash(instruction, response))
    }

    #[must_use]
    pub fn contains(&self, instruction: &str, response: &str) -> bool {
        self.seen.contains(&stable_pair_hash(instruction, response))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

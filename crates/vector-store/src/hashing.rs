//! Token → bucket mapping for the hashing trick.

pub(crate) fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Bucket index of `token` in a feature space of `dim` columns.
///
/// `dim` must be non-zero.
#[must_use]
pub fn bucket_of(token: &str, dim: usize) -> usize {
    (fnv1a_64(token.as_bytes()) % dim as u64) as usize
}

//! Hashing utilities for cache keys

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Compute a hash for any hashable value
pub fn compute_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Fold a structural hash into a 32-bit connection fingerprint.
///
/// Both halves of the 64-bit hash contribute, so descriptors that differ
/// only in the high bits still get distinct fingerprints.
pub fn structural_fingerprint<T: Hash + ?Sized>(value: &T) -> i32 {
    fold_to_i32(compute_hash(value))
}

pub fn fold_to_i32(hash: u64) -> i32 {
    ((hash ^ (hash >> 32)) & 0xFFFF_FFFF) as u32 as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_deterministic() {
        assert_eq!(compute_hash("orders"), compute_hash("orders"));
        assert_ne!(compute_hash("orders"), compute_hash("Orders"));
    }

    #[test]
    fn test_fold_uses_both_halves() {
        assert_eq!(fold_to_i32(0), 0);
        assert_eq!(fold_to_i32(1 << 32), 1);
        assert_eq!(fold_to_i32(0xFFFF_FFFF), -1);
        assert_eq!(fold_to_i32(0xFFFF_FFFF_FFFF_FFFF), 0);
    }
}

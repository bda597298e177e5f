// src/feature_hash.rs
//! Stable 64-bit feature hashing.
//!
//! Fingerprints double as persisted cluster ids, so feature values must be
//! identical in any process on any run. The std `DefaultHasher` is seeded
//! per process and cannot be used here; we take the first 8 bytes of a
//! SHA-256 digest instead.

use sha2::{Digest, Sha256};

/// Deterministic 64-bit hash of a shingle: first 8 bytes of
/// `SHA-256(feature)`, big-endian.
pub fn feature_hash64(feature: &str) -> u64 {
    let digest = Sha256::digest(feature.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest_prefix() {
        // Cross-checked against `sha256("fed")`; pins the exact byte
        // order so persisted cluster ids survive refactors.
        assert_eq!(feature_hash64("fed"), 0x20e7_96c1_2809_6d22);
    }

    #[test]
    fn stable_across_calls() {
        let a = feature_hash64("iphone");
        let b = feature_hash64("iphone");
        assert_eq!(a, b);
        assert_ne!(feature_hash64("iphone"), feature_hash64("iphonf"));
    }

    #[test]
    fn empty_input_is_valid() {
        // Degenerate but well-defined; must not panic.
        let _ = feature_hash64("");
    }
}

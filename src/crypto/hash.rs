//! Hashing utilities
//!
//! SHA-256 helpers used to derive wallet, asset and factory addresses.

use sha2::{Digest, Sha256};

/// Hashes a sequence of parts, each prefixed with its length
///
/// The length prefix keeps `["ab", "c"]` and `["a", "bc"]` from colliding.
pub fn sha256_parts(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

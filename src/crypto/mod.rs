//! Cryptographic utilities
//!
//! Signer identities are authenticated by the host, so the only primitive
//! needed here is hashing for deterministic address derivation.

pub mod hash;

pub use hash::sha256_parts;

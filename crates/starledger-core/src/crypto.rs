//! Hashing primitives for the star ledger.
//!
//! The ledger treats its digest function as a pluggable capability. The
//! default is Blake3; keccak256 is exposed for wallet message hashing.

use sha3::{Digest, Keccak256};

use crate::types::BlockHash;

/// A deterministic 256-bit digest function.
pub trait Hasher: Send + Sync {
    /// Digest the given bytes.
    fn digest(&self, data: &[u8]) -> BlockHash;
}

/// The default block hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn digest(&self, data: &[u8]) -> BlockHash {
        BlockHash(*blake3::hash(data).as_bytes())
    }
}

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

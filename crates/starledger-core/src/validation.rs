//! Chain validation: hash integrity, linkage, height contiguity and genesis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::block::{Block, BlockBody, GenesisPayload};
use crate::crypto::Hasher;
use crate::types::BlockHash;

/// Why a block failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidReason {
    /// Recomputed hash differs from the stored one.
    HashMismatch { computed: BlockHash },
    /// `previous_hash` does not point at the predecessor (or genesis has one).
    BrokenLink { expected: Option<BlockHash> },
    /// `height` does not equal the block's position in the chain.
    HeightMismatch { expected: u64 },
    /// Block 0 does not carry the genesis marker.
    GenesisMarkerMismatch,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::HashMismatch { computed } => {
                write!(f, "hash mismatch (computed {:?})", computed)
            }
            InvalidReason::BrokenLink { expected: Some(h) } => {
                write!(f, "broken link (expected previous {:?})", h)
            }
            InvalidReason::BrokenLink { expected: None } => {
                write!(f, "broken link (genesis must not have a previous hash)")
            }
            InvalidReason::HeightMismatch { expected } => {
                write!(f, "height mismatch (expected {})", expected)
            }
            InvalidReason::GenesisMarkerMismatch => write!(f, "genesis marker mismatch"),
        }
    }
}

/// A block reported by [`validate_chain`], with every check it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidBlock {
    pub height: u64,
    pub hash: BlockHash,
    pub reasons: Vec<InvalidReason>,
}

impl fmt::Display for InvalidBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {} ({:?}): ", self.height, self.hash)?;
        for (i, reason) in self.reasons.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", reason)?;
        }
        Ok(())
    }
}

/// Validate a single block's self-consistency.
pub fn validate_block(block: &Block, hasher: &dyn Hasher) -> bool {
    block.verify_self(hasher)
}

/// Validate an entire chain in order.
///
/// Returns every invalid block; an empty list means the chain is fully
/// consistent. A block whose stored hash was rewritten to match its own
/// tampered content passes its own hash check but breaks the successor's
/// link, so the successor is reported.
pub fn validate_chain(
    blocks: &[Block],
    hasher: &dyn Hasher,
    genesis_marker: &str,
) -> Vec<InvalidBlock> {
    let genesis_body = BlockBody::encode(&GenesisPayload::new(genesis_marker)).ok();
    let mut invalid = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        let mut reasons = Vec::new();

        let computed = block.compute_hash(hasher);
        if computed != block.hash {
            reasons.push(InvalidReason::HashMismatch { computed });
        }

        let expected_prev = match index {
            0 => None,
            _ => Some(blocks[index - 1].hash),
        };
        if block.previous_hash != expected_prev {
            reasons.push(InvalidReason::BrokenLink {
                expected: expected_prev,
            });
        }

        if block.height != index as u64 {
            reasons.push(InvalidReason::HeightMismatch {
                expected: index as u64,
            });
        }

        if index == 0 && genesis_body.as_ref() != Some(&block.body) {
            reasons.push(InvalidReason::GenesisMarkerMismatch);
        }

        if !reasons.is_empty() {
            invalid.push(InvalidBlock {
                height: block.height,
                hash: block.hash,
                reasons,
            });
        }
    }

    invalid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{PendingBlock, GENESIS_MARKER};
    use crate::crypto::Blake3Hasher;
    use serde_json::json;

    fn make_chain(len: usize) -> Vec<Block> {
        let mut chain: Vec<Block> = Vec::with_capacity(len);
        for i in 0..len {
            let pending = if i == 0 {
                PendingBlock::genesis(GENESIS_MARKER).unwrap()
            } else {
                PendingBlock::new(&json!({ "n": i })).unwrap()
            };
            let prev = chain.last().map(|b| b.hash);
            chain.push(pending.seal(i as u64, 1_700_000_000 + i as i64, prev, &Blake3Hasher));
        }
        chain
    }

    #[test]
    fn test_valid_chain() {
        let chain = make_chain(5);
        assert!(validate_chain(&chain, &Blake3Hasher, GENESIS_MARKER).is_empty());
    }

    #[test]
    fn test_empty_chain_is_consistent() {
        assert!(validate_chain(&[], &Blake3Hasher, GENESIS_MARKER).is_empty());
    }

    #[test]
    fn test_tampered_body_reported() {
        let mut chain = make_chain(4);
        chain[2].body = BlockBody::encode(&json!({ "n": 99 })).unwrap();

        let invalid = validate_chain(&chain, &Blake3Hasher, GENESIS_MARKER);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].height, 2);
        assert!(matches!(
            invalid[0].reasons[..],
            [InvalidReason::HashMismatch { .. }]
        ));
    }

    #[test]
    fn test_rehashed_tamper_breaks_successor_link() {
        let mut chain = make_chain(4);
        chain[1].timestamp += 10;
        chain[1].hash = chain[1].compute_hash(&Blake3Hasher);

        let invalid = validate_chain(&chain, &Blake3Hasher, GENESIS_MARKER);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].height, 2);
        assert!(matches!(
            invalid[0].reasons[..],
            [InvalidReason::BrokenLink { .. }]
        ));
    }

    #[test]
    fn test_height_gap_reported() {
        let mut chain = make_chain(3);
        let prev = chain[1].hash;
        chain[2] = PendingBlock::new(&json!({ "n": 2 }))
            .unwrap()
            .seal(5, 1, Some(prev), &Blake3Hasher);

        let invalid = validate_chain(&chain, &Blake3Hasher, GENESIS_MARKER);
        assert_eq!(invalid.len(), 1);
        assert_eq!(
            invalid[0].reasons,
            vec![InvalidReason::HeightMismatch { expected: 2 }]
        );
    }

    #[test]
    fn test_genesis_marker_checked() {
        let chain = vec![PendingBlock::genesis("Not Genesis")
            .unwrap()
            .seal(0, 1, None, &Blake3Hasher)];

        let invalid = validate_chain(&chain, &Blake3Hasher, GENESIS_MARKER);
        assert_eq!(
            invalid[0].reasons,
            vec![InvalidReason::GenesisMarkerMismatch]
        );
    }

    #[test]
    fn test_genesis_with_previous_hash() {
        let chain = vec![PendingBlock::genesis(GENESIS_MARKER).unwrap().seal(
            0,
            1,
            Some(BlockHash::ZERO),
            &Blake3Hasher,
        )];

        let invalid = validate_chain(&chain, &Blake3Hasher, GENESIS_MARKER);
        assert_eq!(
            invalid[0].reasons,
            vec![InvalidReason::BrokenLink { expected: None }]
        );
    }

    #[test]
    fn test_validate_block() {
        let mut chain = make_chain(2);
        assert!(validate_block(&chain[1], &Blake3Hasher));
        chain[1].height = 9;
        assert!(!validate_block(&chain[1], &Blake3Hasher));
    }

    #[test]
    fn test_invalid_block_display() {
        let block = InvalidBlock {
            height: 3,
            hash: BlockHash::from_bytes([0xaa; 32]),
            reasons: vec![
                InvalidReason::HeightMismatch { expected: 2 },
                InvalidReason::GenesisMarkerMismatch,
            ],
        };
        assert_eq!(
            block.to_string(),
            "block 3 (BlockHash(aaaaaaaaaaaaaaaa)): height mismatch (expected 2), genesis marker mismatch"
        );
    }
}

//! In-memory implementation of the BlockStore trait.
//!
//! This is the default backend: the chain lives exactly as long as the
//! process. Thread-safe via RwLock. Like the SQLite store it keeps only the
//! canonical bytes and decodes them on load.

use std::sync::RwLock;

use async_trait::async_trait;
use starledger_core::{decode_block, Block};

use crate::error::{Result, StoreError};
use crate::traits::BlockStore;

/// In-memory store implementation.
pub struct MemoryStore {
    blocks: RwLock<Vec<Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

#[async_trait]
impl BlockStore for MemoryStore {
    async fn append_block(&self, block: &Block, canonical: &[u8]) -> Result<()> {
        let mut blocks = self.blocks.write().map_err(poisoned)?;

        let expected = blocks.len() as u64;
        if block.height != expected {
            return Err(StoreError::HeightConflict {
                expected,
                got: block.height,
            });
        }

        blocks.push(canonical.to_vec());
        Ok(())
    }

    async fn load_chain(&self) -> Result<Vec<Block>> {
        let blocks = self.blocks.read().map_err(poisoned)?;
        blocks
            .iter()
            .enumerate()
            .map(|(height, bytes)| {
                decode_block(bytes).map_err(|e| {
                    StoreError::Serialization(format!("block at height {}: {}", height, e))
                })
            })
            .collect()
    }

    async fn block_count(&self) -> Result<u64> {
        let blocks = self.blocks.read().map_err(poisoned)?;
        Ok(blocks.len() as u64)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use starledger_core::{Blake3Hasher, PendingBlock, GENESIS_MARKER};

    fn make_block(height: u64, prev: Option<&Block>) -> Block {
        let pending = if height == 0 {
            PendingBlock::genesis(GENESIS_MARKER).unwrap()
        } else {
            PendingBlock::new(&serde_json::json!({ "n": height })).unwrap()
        };
        pending.seal(height, 1_700_000_000, prev.map(|b| b.hash), &Blake3Hasher)
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let genesis = make_block(0, None);
        let canonical = genesis.to_canonical_bytes();

        store.append_block(&genesis, &canonical).await.unwrap();

        assert_eq!(store.block_count().await.unwrap(), 1);
        assert_eq!(store.load_chain().await.unwrap(), vec![genesis]);
    }

    #[tokio::test]
    async fn test_memory_store_loads_from_canonical_bytes() {
        let store = MemoryStore::new();
        let genesis = make_block(0, None);
        store.append_block(&genesis, &[0xff, 0x00]).await.unwrap();

        assert!(matches!(
            store.load_chain().await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_store_rejects_height_gap() {
        let store = MemoryStore::new();
        let genesis = make_block(0, None);
        let skipped = make_block(2, Some(&genesis));

        store
            .append_block(&genesis, &genesis.to_canonical_bytes())
            .await
            .unwrap();

        let result = store
            .append_block(&skipped, &skipped.to_canonical_bytes())
            .await;
        assert!(matches!(
            result,
            Err(StoreError::HeightConflict {
                expected: 1,
                got: 2
            })
        ));
        assert_eq!(store.block_count().await.unwrap(), 1);
    }
}

//! BlockStore trait: the abstract interface for block persistence.

use async_trait::async_trait;
use starledger_core::Block;

use crate::error::Result;

/// The BlockStore trait: async interface for block persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, blocking work runs under `spawn_blocking`.
///
/// # Design Notes
///
/// - **Append-only**: `append_block` accepts a block only at
///   `height == block_count()`; anything else is a `HeightConflict`.
/// - **Single writer**: the ledger serializes its own appends, so stores only
///   need to reject, not resolve, conflicting writes.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Persist a committed block.
    ///
    /// # Arguments
    /// - `block`: The block to persist.
    /// - `canonical`: Its canonical bytes. These are what `load_chain`
    ///   decodes, so they must round-trip to `block`.
    async fn append_block(&self, block: &Block, canonical: &[u8]) -> Result<()>;

    /// Load every persisted block in height order.
    async fn load_chain(&self) -> Result<Vec<Block>>;

    /// Number of persisted blocks.
    async fn block_count(&self) -> Result<u64>;
}

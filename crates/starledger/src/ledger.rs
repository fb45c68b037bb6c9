//! The Ledger: the single authoritative, append-only chain of blocks.
//!
//! Every mutation runs under one write lock for the whole
//! seal → validate → persist → commit sequence, so readers never observe a
//! half-appended block and a rejected candidate leaves no trace.

use std::sync::Arc;

use starledger_core::{
    validate_chain, Block, BlockHash, Clock, Hasher, InvalidBlock, PendingBlock, StarRecord,
};
use starledger_store::BlockStore;
use tokio::sync::RwLock;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};

/// A hash-linked chain of blocks backed by a [`BlockStore`].
pub struct Ledger<S: BlockStore> {
    /// Committed blocks, index == height.
    chain: RwLock<Vec<Block>>,
    /// Durable copy of the committed blocks.
    store: S,
    hasher: Arc<dyn Hasher>,
    clock: Arc<dyn Clock>,
    config: LedgerConfig,
}

impl<S: BlockStore> Ledger<S> {
    /// Create an uninitialized ledger.
    ///
    /// The chain is empty and [`height`](Self::height) is `None` until
    /// [`initialize`](Self::initialize) runs.
    pub fn new(
        store: S,
        hasher: Arc<dyn Hasher>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            chain: RwLock::new(Vec::new()),
            store,
            hasher,
            clock,
            config,
        }
    }

    /// Create a ledger and initialize it.
    ///
    /// Loads whatever the store already holds; an empty store gets a fresh
    /// genesis block.
    pub async fn open(
        store: S,
        hasher: Arc<dyn Hasher>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Result<Self> {
        let ledger = Self::new(store, hasher, clock, config);
        ledger.initialize().await?;
        Ok(ledger)
    }

    /// Bring the ledger to the ready state. Idempotent.
    ///
    /// A persisted chain is revalidated and rejected with
    /// [`LedgerError::CorruptChain`] if any block fails.
    pub async fn initialize(&self) -> Result<()> {
        let mut chain = self.chain.write().await;
        if !chain.is_empty() {
            return Ok(());
        }

        let persisted = self.store.load_chain().await?;
        if !persisted.is_empty() {
            let invalid =
                validate_chain(&persisted, self.hasher.as_ref(), &self.config.genesis_marker);
            if !invalid.is_empty() {
                tracing::warn!(invalid = invalid.len(), "persisted chain failed validation");
                return Err(LedgerError::CorruptChain { invalid });
            }

            tracing::info!(blocks = persisted.len(), "loaded persisted chain");
            *chain = persisted;
            return Ok(());
        }

        let genesis = PendingBlock::genesis(&self.config.genesis_marker)?;
        self.append_locked(&mut chain, genesis).await?;
        Ok(())
    }

    /// Height of the newest block, or `None` before initialization.
    pub async fn height(&self) -> Option<u64> {
        let chain = self.chain.read().await;
        chain.len().checked_sub(1).map(|h| h as u64)
    }

    /// Seal `pending` onto the tip of the chain and commit it.
    ///
    /// The candidate is popped again if the extended chain fails validation
    /// or the store refuses it.
    pub(crate) async fn append(&self, pending: PendingBlock) -> Result<Block> {
        let mut chain = self.chain.write().await;
        self.append_locked(&mut chain, pending).await
    }

    async fn append_locked(&self, chain: &mut Vec<Block>, pending: PendingBlock) -> Result<Block> {
        let timestamp = self.clock.now_secs();
        let previous_hash = chain.last().map(|b| b.hash);
        let height = chain.len() as u64;

        let block = pending.seal(height, timestamp, previous_hash, self.hasher.as_ref());
        chain.push(block.clone());

        let invalid = validate_chain(chain, self.hasher.as_ref(), &self.config.genesis_marker);
        if !invalid.is_empty() {
            chain.pop();
            tracing::warn!(
                height,
                invalid = invalid.len(),
                "rolled back block: chain validation failed"
            );
            return Err(LedgerError::ValidationFailure { invalid });
        }

        let canonical = block.to_canonical_bytes();
        if let Err(e) = self.store.append_block(&block, &canonical).await {
            chain.pop();
            tracing::warn!(height, error = %e, "rolled back block: store write failed");
            return Err(e.into());
        }

        tracing::info!(height, hash = %block.hash, "committed block");
        Ok(block)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Find a block by its hash.
    pub async fn get_block_by_hash(&self, hash: &BlockHash) -> Option<Block> {
        let chain = self.chain.read().await;
        chain.iter().find(|b| &b.hash == hash).cloned()
    }

    /// Find a block by its height.
    pub async fn get_block_by_height(&self, height: u64) -> Option<Block> {
        let chain = self.chain.read().await;
        chain.iter().find(|b| b.height == height).cloned()
    }

    /// Every star registered by `address`, in chain order.
    ///
    /// Addresses compare exactly. Bodies that do not decode as a star record
    /// are skipped.
    pub async fn get_blocks_by_owner(&self, address: &str) -> Vec<StarRecord> {
        let chain = self.chain.read().await;
        chain
            .iter()
            .filter(|b| !b.is_genesis())
            .filter_map(|b| match b.star_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(height = b.height, error = %e, "skipping undecodable block body");
                    None
                }
            })
            .filter(|record| record.address == address)
            .collect()
    }

    /// Validate the committed chain. Empty means fully consistent.
    pub async fn validate_chain(&self) -> Vec<InvalidBlock> {
        let chain = self.chain.read().await;
        validate_chain(&chain, self.hasher.as_ref(), &self.config.genesis_marker)
    }

    /// Snapshot of the committed chain.
    pub async fn blocks(&self) -> Vec<Block> {
        self.chain.read().await.clone()
    }

    /// Current time according to the ledger's clock.
    pub fn now_secs(&self) -> i64 {
        self.clock.now_secs()
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }
}

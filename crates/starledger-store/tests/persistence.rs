//! SQLite persistence across reopen.

use starledger_core::{validate_chain, Blake3Hasher, Block, PendingBlock, GENESIS_MARKER};
use starledger_store::{BlockStore, SqliteStore, StoreError};
use tempfile::TempDir;

fn seal_next(chain: &[Block], payload: &serde_json::Value) -> Block {
    let pending = if chain.is_empty() {
        PendingBlock::genesis(GENESIS_MARKER).unwrap()
    } else {
        PendingBlock::new(payload).unwrap()
    };
    pending.seal(
        chain.len() as u64,
        1_700_000_000 + chain.len() as i64,
        chain.last().map(|b| b.hash),
        &Blake3Hasher,
    )
}

#[tokio::test]
async fn test_chain_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let mut chain = Vec::new();
    {
        let store = SqliteStore::open(&path).unwrap();
        for n in 0..4 {
            let block = seal_next(&chain, &serde_json::json!({ "star": n }));
            store
                .append_block(&block, &block.to_canonical_bytes())
                .await
                .unwrap();
            chain.push(block);
        }
    }

    let reopened = SqliteStore::open(&path).unwrap();
    let loaded = reopened.load_chain().await.unwrap();

    assert_eq!(loaded, chain);
    assert!(validate_chain(&loaded, &Blake3Hasher, GENESIS_MARKER).is_empty());
    assert_eq!(reopened.block_count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_reopen_continues_appending() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    let genesis = seal_next(&[], &serde_json::Value::Null);
    {
        let store = SqliteStore::open(&path).unwrap();
        store
            .append_block(&genesis, &genesis.to_canonical_bytes())
            .await
            .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let chain = store.load_chain().await.unwrap();
    let next = seal_next(&chain, &serde_json::json!({ "ra": "16h 29m 1.0s" }));

    // Replaying the genesis height must fail; the next height must not.
    let replay = store
        .append_block(&genesis, &genesis.to_canonical_bytes())
        .await;
    assert!(matches!(replay, Err(StoreError::HeightConflict { .. })));

    store
        .append_block(&next, &next.to_canonical_bytes())
        .await
        .unwrap();
    assert_eq!(store.load_chain().await.unwrap(), vec![genesis, next]);
}

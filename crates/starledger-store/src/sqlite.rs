//! SQLite-backed [`BlockStore`].
//!
//! Keeps the chain across restarts. Reads decode the stored canonical bytes
//! rather than the convenience columns.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use starledger_core::{decode_block, Block};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::BlockStore;

/// Block store backed by a single SQLite connection.
///
/// The connection sits behind a mutex and is only touched from
/// `spawn_blocking`, so async callers never block on disk I/O.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and migrate it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// A throwaway in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn count_blocks(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get(0))?;
    Ok(count as u64)
}

#[async_trait]
impl BlockStore for SqliteStore {
    async fn append_block(&self, block: &Block, canonical: &[u8]) -> Result<()> {
        let block = block.clone();
        let canonical = canonical.to_vec();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let expected = count_blocks(&tx)?;
            if block.height != expected {
                return Err(StoreError::HeightConflict {
                    expected,
                    got: block.height,
                });
            }

            tx.execute(
                "INSERT INTO blocks (
                    height, hash, previous_hash, timestamp, body, canonical_bytes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    block.height as i64,
                    block.hash.0.as_slice(),
                    block.previous_hash.as_ref().map(|h| h.0.to_vec()),
                    block.timestamp,
                    block.body.as_str(),
                    canonical.as_slice(),
                ],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn load_chain(&self) -> Result<Vec<Block>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT height, canonical_bytes FROM blocks ORDER BY height ASC")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?))
            })?;

            let mut blocks = Vec::new();
            for row in rows {
                let (height, bytes) = row?;
                let block = decode_block(&bytes).map_err(|e| {
                    StoreError::Serialization(format!("block at height {}: {}", height, e))
                })?;
                if block.height as i64 != height {
                    return Err(StoreError::InvalidData(format!(
                        "row height {} holds block with height {}",
                        height, block.height
                    )));
                }
                blocks.push(block);
            }

            Ok(blocks)
        })
        .await
    }

    async fn block_count(&self) -> Result<u64> {
        self.with_conn(|conn| count_blocks(conn)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starledger_core::{Blake3Hasher, PendingBlock, GENESIS_MARKER};

    fn make_chain(len: u64) -> Vec<Block> {
        let mut chain: Vec<Block> = Vec::new();
        for height in 0..len {
            let pending = if height == 0 {
                PendingBlock::genesis(GENESIS_MARKER).unwrap()
            } else {
                PendingBlock::new(&serde_json::json!({ "n": height })).unwrap()
            };
            let prev = chain.last().map(|b| b.hash);
            chain.push(pending.seal(height, 1_700_000_000 + height as i64, prev, &Blake3Hasher));
        }
        chain
    }

    #[tokio::test]
    async fn test_sqlite_append_and_load() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = make_chain(3);

        for block in &chain {
            store
                .append_block(block, &block.to_canonical_bytes())
                .await
                .unwrap();
        }

        assert_eq!(store.block_count().await.unwrap(), 3);
        assert_eq!(store.load_chain().await.unwrap(), chain);
    }

    #[tokio::test]
    async fn test_sqlite_rejects_out_of_order_append() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = make_chain(2);

        let result = store
            .append_block(&chain[1], &chain[1].to_canonical_bytes())
            .await;
        assert!(matches!(
            result,
            Err(StoreError::HeightConflict {
                expected: 0,
                got: 1
            })
        ));
        assert_eq!(store.block_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sqlite_detects_corrupt_canonical_bytes() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = make_chain(1);
        store
            .append_block(&chain[0], &[0xff, 0x00])
            .await
            .unwrap();

        assert!(matches!(
            store.load_chain().await,
            Err(StoreError::Serialization(_))
        ));
    }
}

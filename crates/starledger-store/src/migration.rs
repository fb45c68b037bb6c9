//! Versioned SQLite schema.
//!
//! `MIGRATIONS[i]` upgrades a database from version `i` to `i + 1`. The
//! applied version is tracked in `schema_migrations`; all pending steps run in
//! one transaction.

use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};

/// v1: one row per committed block, keyed by height.
///
/// `canonical_bytes` is authoritative; the other columns exist for queries.
const V1_BLOCKS: &str = r#"
    CREATE TABLE blocks (
        height INTEGER PRIMARY KEY,
        hash BLOB NOT NULL UNIQUE,
        previous_hash BLOB,
        timestamp INTEGER NOT NULL,
        body TEXT NOT NULL,
        canonical_bytes BLOB NOT NULL
    );

    CREATE INDEX idx_blocks_timestamp ON blocks(timestamp);
"#;

const MIGRATIONS: &[&str] = &[V1_BLOCKS];

/// Schema version this build writes.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the schema up to [`CURRENT_VERSION`]. Safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        );",
    )?;

    let found = schema_version(conn)?;
    if found > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "schema version {} is ahead of this build ({})",
            found, CURRENT_VERSION
        )));
    }
    if found == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (step, sql) in MIGRATIONS.iter().enumerate().skip(found as usize) {
        let version = step as u32 + 1;
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, strftime('%s', 'now'))",
            params![version],
        )?;
    }
    tx.commit()?;

    tracing::debug!(from = found, to = CURRENT_VERSION, "migrated block store schema");
    Ok(())
}

/// Highest applied version, 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

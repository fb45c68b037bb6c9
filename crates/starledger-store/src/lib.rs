//! # Star Ledger Store
//!
//! Storage abstraction for the star ledger. Provides a trait-based interface
//! for block persistence with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`BlockStore`] - The async trait for all storage operations
//! - [`MemoryStore`] - In-memory storage, the default for a memory-resident ledger
//! - [`SqliteStore`] - SQLite-based persistent storage
//!
//! ## Usage
//!
//! ```rust,no_run
//! use starledger_store::{BlockStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!     let chain = store.load_chain().await.unwrap();
//!     println!("{} blocks on disk", chain.len());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only**: a block is accepted only at height == current block count
//! - **Canonical bytes**: every block is stored in its canonical encoding, and
//!   reloads decode that encoding so stored hashes stay reproducible
//! - **No validation**: stores do not check hashes; the ledger validates
//!   before it writes and again after it loads

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::BlockStore;

//! # Star Ledger
//!
//! A single-writer, tamper-evident registry of stars. Every star is a block
//! on a hash-linked chain, and a block is only written after the submitter
//! proves control of the claimed wallet address by signing a short-lived
//! challenge.
//!
//! ## Overview
//!
//! - **Ledger**: The append-only chain. Seals, validates and commits blocks
//!   under one write lock; a block that would break the chain is rolled back.
//! - **StarRegistry**: The ownership flow. Issues challenges, checks expiry
//!   and signatures, then appends the star.
//! - **BlockStore**: Where committed blocks live. In memory by default,
//!   SQLite when the chain must survive restarts.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use starledger::core::{Blake3Hasher, SystemClock};
//! use starledger::store::MemoryStore;
//! use starledger::{Ledger, LedgerConfig, StarRegistry};
//!
//! async fn example() {
//!     let ledger = Ledger::open(
//!         MemoryStore::new(),
//!         Arc::new(Blake3Hasher),
//!         Arc::new(SystemClock),
//!         LedgerConfig::default(),
//!     )
//!     .await
//!     .unwrap();
//!     let registry = StarRegistry::with_personal_sign(Arc::new(ledger));
//!
//!     // The wallet signs this message off-line.
//!     let message = registry.request_challenge("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
//!
//!     // let block = registry
//!     //     .submit_star(address, &message, &signature, serde_json::json!({ "story": "..." }))
//!     //     .await
//!     //     .unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `starledger::core` - Blocks, hashing, challenges, signature verifiers
//! - `starledger::store` - Storage abstraction, memory and SQLite backends

pub mod config;
pub mod error;
pub mod ledger;
pub mod registry;

// Re-export component crates
pub use starledger_core as core;
pub use starledger_store as store;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use registry::StarRegistry;

// Re-export commonly used core types
pub use starledger_core::{
    Block, BlockHash, Challenge, InvalidBlock, InvalidReason, PendingBlock, StarRecord,
};

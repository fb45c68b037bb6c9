//! # Star Ledger Testkit
//!
//! Testing utilities for the star ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known hash inputs that pin the canonical block encoding
//! - **Generators**: Proptest strategies for payloads, wallets and whole chains
//! - **Fixtures**: Signing wallets and a registry on a manual clock
//!
//! ## Golden Vectors
//!
//! ```rust
//! use starledger_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use starledger_testkit::generators::chain;
//!
//! proptest! {
//!     #[test]
//!     fn chains_validate(blocks in chain(8)) {
//!         prop_assert!(validate_chain(&blocks, &Blake3Hasher, GENESIS_MARKER).is_empty());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use starledger_testkit::fixtures::{sample_star, TestFixture, Wallet};
//!
//! let fixture = TestFixture::new().await;
//! let wallet = Wallet::random();
//! let block = fixture.register(&wallet, sample_star(1)).await?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_star, wallets, Ed25519Wallet, TestFixture, Wallet, FIXTURE_EPOCH};
pub use generators::{chain, star_payload};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};

//! # Star Ledger Core
//!
//! Pure primitives for the star ledger: blocks, canonical encoding, chain
//! validation, ownership challenges and signature verification.
//!
//! This crate contains no I/O, no storage, no locking. It is pure computation
//! over hash-linked data structures.
//!
//! ## Key Types
//!
//! - [`Block`] - A committed, hash-linked ledger entry
//! - [`PendingBlock`] - A payload waiting to be sealed by the ledger
//! - [`BlockHash`] - 32-byte digest, rendered as lowercase hex
//! - [`StarRecord`] - The payload of every non-genesis block
//! - [`Challenge`] - The time-bound message a wallet signs to prove ownership
//!
//! ## Canonicalization
//!
//! Block hashes are computed over deterministic CBOR. See the [`canonical`]
//! module for the field order and encoding rules.

pub mod block;
pub mod canonical;
pub mod challenge;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod signature;
pub mod types;
pub mod validation;

pub use block::{Block, BlockBody, GenesisPayload, PendingBlock, StarRecord, GENESIS_MARKER};
pub use canonical::{block_bytes, decode_block, hash_input_bytes};
pub use challenge::{Challenge, DEFAULT_CHALLENGE_SUFFIX, DEFAULT_CHALLENGE_WINDOW_SECS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{keccak256, Blake3Hasher, Hasher};
pub use error::{ChallengeError, CoreError, VerifierError};
pub use signature::{
    address_from_verifying_key, personal_message_hash, recover_address, Ed25519Verifier,
    PersonalSignVerifier, SignatureVerifier,
};
pub use types::BlockHash;
pub use validation::{validate_block, validate_chain, InvalidBlock, InvalidReason};

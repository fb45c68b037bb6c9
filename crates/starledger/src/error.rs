//! Error types for the ledger and the star registry.

use starledger_core::{ChallengeError, CoreError, InvalidBlock, StarRecord};
use starledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during ledger and registry operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The candidate block left the chain inconsistent and was rolled back.
    #[error("chain validation failed: {}", display_invalid(.invalid))]
    ValidationFailure { invalid: Vec<InvalidBlock> },

    /// The signed challenge is older than the allowed window.
    #[error("challenge issued at {issued_at} expired (now {now}, window {window}s)")]
    ExpiredChallenge { issued_at: i64, now: i64, window: u64 },

    /// The signature did not prove ownership of the address.
    ///
    /// Carries the rejected submission for audit.
    #[error("signature rejected for {}: {reason}", .record.address)]
    SignatureRejected { record: StarRecord, reason: String },

    /// The message is not a well-formed challenge.
    #[error("malformed challenge: {0}")]
    MalformedChallenge(String),

    /// The challenge was issued to a different address than the submitter's.
    #[error("challenge address {challenge} does not match submitted address {submitted}")]
    ChallengeMismatch { challenge: String, submitted: String },

    /// A persisted chain failed validation on open.
    #[error("persisted chain is corrupt: {}", display_invalid(.invalid))]
    CorruptChain { invalid: Vec<InvalidBlock> },

    /// Payload encoding or decoding error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<ChallengeError> for LedgerError {
    fn from(e: ChallengeError) -> Self {
        match e {
            ChallengeError::Malformed(msg) => LedgerError::MalformedChallenge(msg),
        }
    }
}

fn display_invalid(invalid: &[InvalidBlock]) -> String {
    invalid
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

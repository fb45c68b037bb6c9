//! Error types for the star ledger core.

use thiserror::Error;

/// Core errors that can occur while encoding or decoding blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("malformed block body: {0}")]
    MalformedBody(String),

    #[error("malformed block: {0}")]
    MalformedBlock(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Errors raised while parsing an ownership challenge message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    #[error("malformed challenge message: {0}")]
    Malformed(String),
}

/// Faults raised by a signature verifier.
///
/// A fault is distinct from a clean "signature does not match" answer, but the
/// ownership flow treats both as a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("public key recovery failed")]
    RecoveryFailed,
}

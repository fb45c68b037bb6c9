//! Star registration behind an ownership challenge.
//!
//! A submitter first asks for a challenge, signs it with the wallet that
//! controls the address, and sends the signature back together with the
//! star. Only a fresh, correctly signed challenge gets a block.

use std::sync::Arc;

use starledger_core::{
    Block, Challenge, PendingBlock, PersonalSignVerifier, SignatureVerifier, StarRecord,
};
use starledger_store::BlockStore;

use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;

/// The ownership flow in front of a [`Ledger`].
pub struct StarRegistry<S: BlockStore, V: SignatureVerifier = PersonalSignVerifier> {
    ledger: Arc<Ledger<S>>,
    verifier: V,
}

impl<S: BlockStore> StarRegistry<S> {
    /// Registry using wallet personal-sign signatures.
    pub fn with_personal_sign(ledger: Arc<Ledger<S>>) -> Self {
        Self::new(ledger, PersonalSignVerifier)
    }
}

impl<S: BlockStore, V: SignatureVerifier> StarRegistry<S, V> {
    pub fn new(ledger: Arc<Ledger<S>>, verifier: V) -> Self {
        Self { ledger, verifier }
    }

    /// The shared ledger, for read queries.
    pub fn ledger(&self) -> Arc<Ledger<S>> {
        Arc::clone(&self.ledger)
    }

    /// Stars owned by `address`, after folding it the way submissions are
    /// recorded.
    pub async fn stars_of(&self, address: &str) -> Vec<StarRecord> {
        let canonical = self.verifier.canonical_address(address);
        self.ledger.get_blocks_by_owner(&canonical).await
    }

    /// Build the message `address` must sign to register a star.
    ///
    /// Nothing is recorded; every challenge is usable until its window
    /// elapses.
    pub fn request_challenge(&self, address: &str) -> String {
        let issued_at = self.ledger.now_secs();
        let challenge = Challenge::new(address, issued_at, &self.ledger.config().challenge_suffix);
        tracing::debug!(address, issued_at, "issued ownership challenge");
        challenge.message()
    }

    /// Register `star` for `address` if `signature` proves ownership.
    ///
    /// Rejections leave the chain untouched.
    pub async fn submit_star(
        &self,
        address: &str,
        message: &str,
        signature: &str,
        star: serde_json::Value,
    ) -> Result<Block> {
        let config = self.ledger.config();

        let challenge = Challenge::parse(message)?;
        if challenge.suffix != config.challenge_suffix {
            return Err(LedgerError::MalformedChallenge(format!(
                "unexpected suffix {:?}",
                challenge.suffix
            )));
        }
        if challenge.address != address {
            tracing::warn!(address, challenge = %challenge.address, "challenge address mismatch");
            return Err(LedgerError::ChallengeMismatch {
                challenge: challenge.address,
                submitted: address.to_string(),
            });
        }

        let now = self.ledger.now_secs();
        if challenge.is_expired(now, config.challenge_window_secs) {
            tracing::warn!(
                address,
                issued_at = challenge.issued_at,
                now,
                "rejected expired challenge"
            );
            return Err(LedgerError::ExpiredChallenge {
                issued_at: challenge.issued_at,
                now,
                window: config.challenge_window_secs,
            });
        }

        let record = StarRecord {
            address: self.verifier.canonical_address(address),
            message: message.to_string(),
            signature: signature.to_string(),
            star,
        };

        let rejection = match self.verifier.verify(message, address, signature) {
            Ok(true) => None,
            Ok(false) => Some("signature does not match address".to_string()),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = rejection {
            tracing::warn!(address, %reason, "rejected star submission");
            return Err(LedgerError::SignatureRejected { record, reason });
        }

        let pending = PendingBlock::new(&record)?;
        self.ledger.append(pending).await
    }
}

//! Ledger configuration.

use serde::{Deserialize, Serialize};
use starledger_core::{DEFAULT_CHALLENGE_SUFFIX, DEFAULT_CHALLENGE_WINDOW_SECS, GENESIS_MARKER};

/// Configuration for a [`Ledger`](crate::Ledger) and the registry on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Seconds a challenge stays valid after issuance.
    pub challenge_window_secs: u64,
    /// Last component of every challenge message.
    pub challenge_suffix: String,
    /// The `data` value of the genesis block.
    pub genesis_marker: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            challenge_window_secs: DEFAULT_CHALLENGE_WINDOW_SECS,
            challenge_suffix: DEFAULT_CHALLENGE_SUFFIX.to_string(),
            genesis_marker: GENESIS_MARKER.to_string(),
        }
    }
}

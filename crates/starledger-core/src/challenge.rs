//! Ownership challenges.
//!
//! A challenge is never stored. It is the message
//! `"<address>:<issued_at>:<suffix>"`, which the wallet signs and the
//! submitter sends back. Any challenge stays usable until its window elapses.

use std::fmt;

use crate::error::ChallengeError;

/// Suffix appended to every challenge message.
pub const DEFAULT_CHALLENGE_SUFFIX: &str = "starRegistry";

/// How long a challenge stays valid, in seconds.
pub const DEFAULT_CHALLENGE_WINDOW_SECS: u64 = 300;

/// A parsed challenge message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub address: String,
    pub issued_at: i64,
    pub suffix: String,
}

impl Challenge {
    pub fn new(address: impl Into<String>, issued_at: i64, suffix: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            issued_at,
            suffix: suffix.into(),
        }
    }

    /// The message string a wallet signs.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Parse a challenge message.
    ///
    /// Splits from the right, so the address part may itself contain `:`.
    pub fn parse(message: &str) -> Result<Self, ChallengeError> {
        let mut parts = message.rsplitn(3, ':');
        let suffix = parts.next().unwrap_or_default();
        let issued_at = parts
            .next()
            .ok_or_else(|| ChallengeError::Malformed("missing timestamp".into()))?;
        let address = parts
            .next()
            .ok_or_else(|| ChallengeError::Malformed("missing address".into()))?;

        if address.is_empty() {
            return Err(ChallengeError::Malformed("empty address".into()));
        }
        if suffix.is_empty() {
            return Err(ChallengeError::Malformed("empty suffix".into()));
        }

        let issued_at = issued_at
            .parse::<i64>()
            .map_err(|e| ChallengeError::Malformed(format!("invalid timestamp: {}", e)))?;

        Ok(Self::new(address, issued_at, suffix))
    }

    /// Seconds elapsed between issuance and `now` (negative if issued in the future).
    pub fn elapsed(&self, now: i64) -> i64 {
        now.saturating_sub(self.issued_at)
    }

    /// True once more than `window_secs` have elapsed.
    pub fn is_expired(&self, now: i64, window_secs: u64) -> bool {
        i128::from(self.elapsed(now)) > i128::from(window_secs)
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.address, self.issued_at, self.suffix)
    }
}

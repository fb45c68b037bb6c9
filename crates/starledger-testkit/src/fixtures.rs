//! Test fixtures and helpers.
//!
//! Wallets that sign challenges the way real wallet software does, and a
//! ready-to-use registry on a manual clock.

use std::sync::Arc;

use k256::ecdsa::SigningKey;
use serde_json::json;

use starledger::{Block, Ledger, LedgerConfig, StarRegistry};
use starledger_core::{address_from_verifying_key, personal_message_hash, Blake3Hasher, ManualClock};
use starledger_store::MemoryStore;

/// Time at which every fixture clock starts.
pub const FIXTURE_EPOCH: i64 = 1_700_000_000;

/// A secp256k1 wallet producing personal-sign signatures.
#[derive(Clone)]
pub struct Wallet {
    key: SigningKey,
}

impl Wallet {
    /// Deterministic wallet. The seed is used directly as the private key.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_slice(&seed).expect("seed is not a valid secp256k1 scalar"),
        }
    }

    /// Wallet with a fresh random key.
    pub fn random() -> Self {
        Self {
            key: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// `0x`-prefixed lowercase address.
    pub fn address(&self) -> String {
        address_from_verifying_key(self.key.verifying_key())
    }

    /// Sign `message`: 65 bytes `r || s || v` as `0x` hex, `v` in {27, 28}.
    pub fn sign(&self, message: &str) -> String {
        let (sig, recovery_id) = self
            .key
            .sign_prehash_recoverable(&personal_message_hash(message))
            .expect("signing a 32-byte prehash");
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        format!("0x{}", hex::encode(bytes))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish()
    }
}

/// An Ed25519 wallet whose address is its hex public key.
pub struct Ed25519Wallet {
    key: ed25519_dalek::SigningKey,
}

impl Ed25519Wallet {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            key: ed25519_dalek::SigningKey::from_bytes(&seed),
        }
    }

    pub fn random() -> Self {
        Self {
            key: ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    pub fn address(&self) -> String {
        hex::encode(self.key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &str) -> String {
        use ed25519_dalek::Signer;
        hex::encode(self.key.sign(message.as_bytes()).to_bytes())
    }
}

/// A registry over an in-memory ledger whose clock the test controls.
pub struct TestFixture {
    pub clock: Arc<ManualClock>,
    pub registry: StarRegistry<MemoryStore>,
}

impl TestFixture {
    /// Create a fixture with the default configuration.
    pub async fn new() -> Self {
        Self::with_config(LedgerConfig::default()).await
    }

    /// Create a fixture with a custom configuration.
    pub async fn with_config(config: LedgerConfig) -> Self {
        let clock = Arc::new(ManualClock::new(FIXTURE_EPOCH));
        let ledger = Ledger::open(
            MemoryStore::new(),
            Arc::new(Blake3Hasher),
            clock.clone(),
            config,
        )
        .await
        .expect("in-memory ledger opens");

        Self {
            clock,
            registry: StarRegistry::with_personal_sign(Arc::new(ledger)),
        }
    }

    pub fn ledger(&self) -> Arc<Ledger<MemoryStore>> {
        self.registry.ledger()
    }

    /// Request a challenge for `wallet` and sign it.
    ///
    /// Returns `(message, signature)`.
    pub fn signed_challenge(&self, wallet: &Wallet) -> (String, String) {
        let message = self.registry.request_challenge(&wallet.address());
        let signature = wallet.sign(&message);
        (message, signature)
    }

    /// Run the whole ownership flow for `wallet` without advancing time.
    pub async fn register(&self, wallet: &Wallet, star: serde_json::Value) -> starledger::Result<Block> {
        let (message, signature) = self.signed_challenge(wallet);
        self.registry
            .submit_star(&wallet.address(), &message, &signature, star)
            .await
    }
}

/// Deterministic wallets for multi-party tests.
pub fn wallets(count: usize) -> Vec<Wallet> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = 0x10;
            seed[31] = i as u8 + 1;
            Wallet::from_seed(seed)
        })
        .collect()
}

/// A plausible star payload, distinct per `n`.
pub fn sample_star(n: u32) -> serde_json::Value {
    json!({
        "dec": format!("68° 52' {}.{}", 56 + n % 4, n),
        "ra": format!("16h 29m {}.0s", n % 60),
        "story": format!("Found star #{} using a backyard telescope", n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use starledger_core::{Ed25519Verifier, PersonalSignVerifier, SignatureVerifier};

    #[test]
    fn test_seeded_wallet_is_deterministic() {
        let mut seed = [0u8; 32];
        seed[31] = 1;
        let wallet = Wallet::from_seed(seed);
        assert_eq!(wallet.address(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
        assert_eq!(Wallet::from_seed(seed).address(), wallet.address());
    }

    #[test]
    fn test_wallet_signature_verifies() {
        let wallet = Wallet::random();
        let message = format!("{}:{}:starRegistry", wallet.address(), FIXTURE_EPOCH);
        let signature = wallet.sign(&message);

        assert_eq!(signature.len(), 2 + 130);
        assert!(PersonalSignVerifier
            .verify(&message, &wallet.address(), &signature)
            .unwrap());
    }

    #[test]
    fn test_ed25519_wallet_signature_verifies() {
        let wallet = Ed25519Wallet::from_seed([7u8; 32]);
        let signature = wallet.sign("hello");
        assert!(Ed25519Verifier
            .verify("hello", &wallet.address(), &signature)
            .unwrap());
        assert!(!Ed25519Verifier
            .verify("goodbye", &wallet.address(), &signature)
            .unwrap());
    }

    #[test]
    fn test_wallets_are_distinct() {
        let wallets = wallets(4);
        let mut addresses: Vec<_> = wallets.iter().map(Wallet::address).collect();
        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), 4);
    }

    #[tokio::test]
    async fn test_fixture_register() {
        let fixture = TestFixture::new().await;
        let wallet = Wallet::random();

        let block = fixture.register(&wallet, sample_star(1)).await.unwrap();
        assert_eq!(block.height, 1);
        assert_eq!(block.timestamp, FIXTURE_EPOCH);
        assert_eq!(fixture.ledger().get_blocks_by_owner(&wallet.address()).await.len(), 1);
    }
}

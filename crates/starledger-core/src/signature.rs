//! Wallet signature verification.
//!
//! The ledger only needs a yes/no answer to "did the key behind `address`
//! sign `message`?". [`PersonalSignVerifier`] answers it for the message
//! signing scheme common wallet software uses (secp256k1, recoverable,
//! keccak256 over the prefixed message). [`Ed25519Verifier`] answers it for
//! addresses that are raw Ed25519 public keys.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::crypto::keccak256;
use crate::error::VerifierError;

/// Prefix prepended to a message before hashing, per wallet personal-sign.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Verifies that `signature` over `message` was produced by the key
/// controlling `address`.
///
/// `Ok(false)` is a clean mismatch; `Err(_)` is a fault (unparseable input,
/// failed recovery). Callers may treat both as a rejection.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, message: &str, address: &str, signature: &str) -> Result<bool, VerifierError>;

    /// The form of `address` that gets recorded on the ledger.
    ///
    /// Owner lookups compare addresses exactly, so a scheme whose addresses
    /// are case-insensitive folds them here. The default keeps the address
    /// as submitted.
    fn canonical_address(&self, address: &str) -> String {
        address.to_string()
    }
}

/// Digest a message the way wallets do for personal-sign.
pub fn personal_message_hash(message: &str) -> [u8; 32] {
    let mut data =
        Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 20 + message.len());
    data.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message.as_bytes());
    keccak256(&data)
}

/// Derive the `0x`-prefixed lowercase address of a secp256k1 public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point prefix.
    let hash = keccak256(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Recover the address that signed `message`.
///
/// `signature` is 65 bytes `r || s || v` in hex, `0x` prefix optional.
pub fn recover_address(message: &str, signature: &str) -> Result<String, VerifierError> {
    let bytes = decode_hex(signature)
        .map_err(|e| VerifierError::InvalidSignature(e.to_string()))?;
    if bytes.len() != 65 {
        return Err(VerifierError::InvalidSignature(format!(
            "expected 65 bytes, got {}",
            bytes.len()
        )));
    }

    let sig = Signature::from_slice(&bytes[..64])
        .map_err(|e| VerifierError::InvalidSignature(e.to_string()))?;
    let recovery_id = parse_recovery_id(bytes[64])?;

    let prehash = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
        .map_err(|_| VerifierError::RecoveryFailed)?;

    Ok(address_from_verifying_key(&key))
}

/// Personal-sign verifier for `0x`-prefixed 20-byte addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalSignVerifier;

impl SignatureVerifier for PersonalSignVerifier {
    fn verify(&self, message: &str, address: &str, signature: &str) -> Result<bool, VerifierError> {
        let expected = normalize_address(address)?;
        let recovered = recover_address(message, signature)?;
        Ok(recovered == expected)
    }

    /// Well-formed addresses are lowercased; anything else is left alone and
    /// fails in `verify`.
    fn canonical_address(&self, address: &str) -> String {
        normalize_address(address).unwrap_or_else(|_| address.to_string())
    }
}

/// Verifier for addresses that are hex-encoded Ed25519 public keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, message: &str, address: &str, signature: &str) -> Result<bool, VerifierError> {
        use ed25519_dalek::Verifier;

        let key_bytes: [u8; 32] = decode_hex(address)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| VerifierError::InvalidAddress("expected 32-byte hex key".into()))?;
        let key = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| VerifierError::InvalidAddress(e.to_string()))?;

        let sig_bytes: [u8; 64] = decode_hex(signature)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                VerifierError::InvalidSignature("expected 64-byte hex signature".into())
            })?;
        let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);

        Ok(key.verify(message.as_bytes(), &sig).is_ok())
    }

    fn canonical_address(&self, address: &str) -> String {
        match decode_hex(address) {
            Ok(bytes) if bytes.len() == 32 => hex::encode(bytes),
            _ => address.to_string(),
        }
    }
}

/// Check the shape of a `0x` address and lowercase it.
fn normalize_address(address: &str) -> Result<String, VerifierError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| VerifierError::InvalidAddress("missing 0x prefix".into()))?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(VerifierError::InvalidAddress(
            "expected 40 hex characters".into(),
        ));
    }

    Ok(format!("0x{}", hex_part.to_ascii_lowercase()))
}

fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, VerifierError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => {
            return Err(VerifierError::InvalidSignature(format!(
                "invalid recovery id {}",
                v
            )))
        }
    };

    RecoveryId::from_byte(id)
        .ok_or_else(|| VerifierError::InvalidSignature(format!("invalid recovery id {}", v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Signer;
    use k256::ecdsa::SigningKey;

    fn wallet() -> (SigningKey, String) {
        let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        let address = address_from_verifying_key(key.verifying_key());
        (key, address)
    }

    fn personal_sign(key: &SigningKey, message: &str) -> String {
        let (sig, recid) = key
            .sign_prehash_recoverable(&personal_message_hash(message))
            .unwrap();
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(recid.to_byte() + 27);
        format!("0x{}", hex::encode(bytes))
    }

    #[test]
    fn test_known_private_key_address() {
        // Private key 1 maps to this well-known address.
        let mut seed = [0u8; 32];
        seed[31] = 1;
        let key = SigningKey::from_slice(&seed).unwrap();
        assert_eq!(
            address_from_verifying_key(key.verifying_key()),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_personal_sign_roundtrip() {
        let (key, address) = wallet();
        let message = format!("{}:1700000000:starRegistry", address);
        let signature = personal_sign(&key, &message);

        assert_eq!(recover_address(&message, &signature).unwrap(), address);
        assert!(PersonalSignVerifier
            .verify(&message, &address, &signature)
            .unwrap());
    }

    #[test]
    fn test_address_comparison_ignores_case() {
        let (key, address) = wallet();
        let message = "hello";
        let signature = personal_sign(&key, message);
        let upper = format!("0x{}", address[2..].to_ascii_uppercase());

        assert!(PersonalSignVerifier.verify(message, &upper, &signature).unwrap());
    }

    #[test]
    fn test_canonical_address_folds_only_hex_schemes() {
        let (_, address) = wallet();
        let upper = format!("0x{}", address[2..].to_ascii_uppercase());
        assert_eq!(PersonalSignVerifier.canonical_address(&upper), address);
        assert_eq!(PersonalSignVerifier.canonical_address("0xABC"), "0xABC");

        let key = hex::encode([0xab; 32]);
        assert_eq!(Ed25519Verifier.canonical_address(&key.to_ascii_uppercase()), key);

        struct Exact;
        impl SignatureVerifier for Exact {
            fn verify(&self, _: &str, _: &str, _: &str) -> Result<bool, VerifierError> {
                Ok(true)
            }
        }
        let base58 = "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2";
        assert_eq!(Exact.canonical_address(base58), base58);
    }

    #[test]
    fn test_wrong_message_does_not_verify() {
        let (key, address) = wallet();
        let signature = personal_sign(&key, "original");

        assert!(!PersonalSignVerifier
            .verify("tampered", &address, &signature)
            .unwrap());
    }

    #[test]
    fn test_other_address_does_not_verify() {
        let (key, _) = wallet();
        let other = SigningKey::from_slice(&[0x07; 32]).unwrap();
        let other_address = address_from_verifying_key(other.verifying_key());
        let signature = personal_sign(&key, "hello");

        assert!(!PersonalSignVerifier
            .verify("hello", &other_address, &signature)
            .unwrap());
    }

    #[test]
    fn test_malformed_inputs_are_faults() {
        let (_, address) = wallet();

        assert!(matches!(
            PersonalSignVerifier.verify("m", "0xABC", "0x00"),
            Err(VerifierError::InvalidAddress(_))
        ));
        assert!(matches!(
            PersonalSignVerifier.verify("m", &address, "zz"),
            Err(VerifierError::InvalidSignature(_))
        ));
        assert!(matches!(
            PersonalSignVerifier.verify("m", &address, &"00".repeat(10)),
            Err(VerifierError::InvalidSignature(_))
        ));

        let mut bad_v = "11".repeat(64);
        bad_v.push_str("05");
        assert!(matches!(
            PersonalSignVerifier.verify("m", &address, &bad_v),
            Err(VerifierError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_ed25519_verifier() {
        let key = ed25519_dalek::SigningKey::from_bytes(&[0x42; 32]);
        let address = hex::encode(key.verifying_key().to_bytes());
        let signature = hex::encode(key.sign(b"hello").to_bytes());

        assert!(Ed25519Verifier.verify("hello", &address, &signature).unwrap());
        assert!(!Ed25519Verifier.verify("hellO", &address, &signature).unwrap());
        assert!(matches!(
            Ed25519Verifier.verify("hello", "abcd", &signature),
            Err(VerifierError::InvalidAddress(_))
        ));
        assert!(matches!(
            Ed25519Verifier.verify("hello", &address, "abcd"),
            Err(VerifierError::InvalidSignature(_))
        ));
    }
}

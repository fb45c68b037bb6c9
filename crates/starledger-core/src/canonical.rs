//! Canonical CBOR encoding for deterministic block hashing.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 seconds)
//!
//! The hash input of a block is a map with integer keys in this fixed order:
//!
//! | key | field           | type                       |
//! |-----|-----------------|----------------------------|
//! | 0   | `previous_hash` | bytes (32) or null         |
//! | 1   | `timestamp`     | integer                    |
//! | 2   | `height`        | unsigned integer           |
//! | 3   | `body`          | text (hex-encoded payload) |
//!
//! The persisted form of a block is the same map plus key 4, the stored
//! `hash` (bytes, 32). Changing any of this changes every block hash.

use ciborium::value::{Integer, Value};

use crate::block::{Block, BlockBody};
use crate::error::CoreError;
use crate::types::BlockHash;

/// Block field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const PREVIOUS_HASH: u64 = 0;
    pub const TIMESTAMP: u64 = 1;
    pub const HEIGHT: u64 = 2;
    pub const BODY: u64 = 3;
    pub const HASH: u64 = 4;
}

/// Encode the hash input of a block: every field except the hash itself.
pub fn hash_input_bytes(
    previous_hash: Option<&BlockHash>,
    timestamp: i64,
    height: u64,
    body: &BlockBody,
) -> Vec<u8> {
    let value = Value::Map(hash_input_entries(previous_hash, timestamp, height, body));
    encode_cbor_value_canonical(&value)
}

/// Encode a full block, hash included, for persistence.
pub fn block_bytes(block: &Block) -> Vec<u8> {
    let mut entries = hash_input_entries(
        block.previous_hash.as_ref(),
        block.timestamp,
        block.height,
        &block.body,
    );
    entries.push((
        Value::Integer(keys::HASH.into()),
        Value::Bytes(block.hash.0.to_vec()),
    ));
    encode_cbor_value_canonical(&Value::Map(entries))
}

/// Decode a block from its persisted canonical bytes.
///
/// The input must be canonical: re-encoding the decoded block has to
/// reproduce it byte for byte.
pub fn decode_block(bytes: &[u8]) -> Result<Block, CoreError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::Decoding(e.to_string()))?;

    let block = cbor_value_to_block(&value)?;

    if block_bytes(&block) != bytes {
        return Err(CoreError::MalformedBlock("non-canonical encoding".into()));
    }

    Ok(block)
}

fn hash_input_entries(
    previous_hash: Option<&BlockHash>,
    timestamp: i64,
    height: u64,
    body: &BlockBody,
) -> Vec<(Value, Value)> {
    let previous = match previous_hash {
        Some(hash) => Value::Bytes(hash.0.to_vec()),
        None => Value::Null,
    };

    vec![
        (Value::Integer(keys::PREVIOUS_HASH.into()), previous),
        (
            Value::Integer(keys::TIMESTAMP.into()),
            Value::Integer(timestamp.into()),
        ),
        (
            Value::Integer(keys::HEIGHT.into()),
            Value::Integer(height.into()),
        ),
        (
            Value::Integer(keys::BODY.into()),
            Value::Text(body.as_str().to_owned()),
        ),
    ]
}

/// Convert a CBOR Value (map) back to a Block.
fn cbor_value_to_block(value: &Value) -> Result<Block, CoreError> {
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::MalformedBlock("expected map".into())),
    };

    if map.len() != 5 {
        return Err(CoreError::MalformedBlock(format!(
            "expected 5 fields, got {}",
            map.len()
        )));
    }

    let get = |key: u64| -> Option<&Value> {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == key as i128))
            .map(|(_, v)| v)
    };

    let previous_hash = match get(keys::PREVIOUS_HASH) {
        Some(Value::Null) => None,
        Some(Value::Bytes(b)) => Some(hash_from_slice(b, "previous_hash")?),
        _ => return Err(CoreError::MalformedBlock("invalid previous_hash".into())),
    };

    let timestamp = match get(keys::TIMESTAMP) {
        Some(Value::Integer(i)) => i64::try_from(i128::from(*i))
            .map_err(|_| CoreError::MalformedBlock("timestamp out of range".into()))?,
        _ => return Err(CoreError::MalformedBlock("missing timestamp".into())),
    };

    let height = match get(keys::HEIGHT) {
        Some(Value::Integer(i)) => u64::try_from(i128::from(*i))
            .map_err(|_| CoreError::MalformedBlock("height out of range".into()))?,
        _ => return Err(CoreError::MalformedBlock("missing height".into())),
    };

    let body = match get(keys::BODY) {
        Some(Value::Text(s)) => BlockBody::from_encoded(s.clone()),
        _ => return Err(CoreError::MalformedBlock("missing body".into())),
    };

    let hash = match get(keys::HASH) {
        Some(Value::Bytes(b)) => hash_from_slice(b, "hash")?,
        _ => return Err(CoreError::MalformedBlock("missing hash".into())),
    };

    Ok(Block {
        height,
        timestamp,
        previous_hash,
        hash,
        body,
    })
}

fn hash_from_slice(bytes: &[u8], field: &str) -> Result<BlockHash, CoreError> {
    BlockHash::try_from(bytes)
        .map_err(|_| CoreError::MalformedBlock(format!("{} must be 32 bytes", field)))
}

/// Encode a CBOR Value to canonical bytes.
fn encode_cbor_value_canonical(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

/// Recursively encode a CBOR value.
///
/// Only the value types that block encoding produces are supported.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Value::Text(s) => {
            encode_uint(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Null => buf.push(0xf6),
        other => unreachable!("block encoding never produces {:?}", other),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n = i128::from(i);

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> BlockBody {
        BlockBody::from_encoded(text.to_owned())
    }

    #[test]
    fn test_hash_input_genesis_shape() {
        // {0: null, 1: 0, 2: 0, 3: ""}
        let bytes = hash_input_bytes(None, 0, 0, &body(""));
        assert_eq!(
            bytes,
            vec![0xa4, 0x00, 0xf6, 0x01, 0x00, 0x02, 0x00, 0x03, 0x60]
        );
    }

    #[test]
    fn test_integer_widths() {
        let mut buf = Vec::new();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 0x18]);

        buf.clear();
        encode_uint(&mut buf, 0, 1_700_000_000);
        assert_eq!(buf, vec![0x1a, 0x65, 0x53, 0xf1, 0x00]);

        buf.clear();
        encode_integer(&mut buf, Integer::from(-1i64));
        assert_eq!(buf, vec![0x20]);
    }

    #[test]
    fn test_previous_hash_changes_input() {
        let a = hash_input_bytes(None, 1, 1, &body("00"));
        let prev = BlockHash::from_bytes([0x11; 32]);
        let b = hash_input_bytes(Some(&prev), 1, 1, &body("00"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_block_bytes_roundtrip() {
        let block = Block {
            height: 7,
            timestamp: 1_700_000_000,
            previous_hash: Some(BlockHash::from_bytes([0x22; 32])),
            hash: BlockHash::from_bytes([0x33; 32]),
            body: body("7b7d"),
        };

        let bytes = block_bytes(&block);
        let decoded = decode_block(&bytes).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_block(&[0xff, 0x00]),
            Err(CoreError::Decoding(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_map() {
        // CBOR unsigned integer 1
        assert!(matches!(
            decode_block(&[0x01]),
            Err(CoreError::MalformedBlock(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_canonical_integer() {
        let block = Block {
            height: 1,
            timestamp: 5,
            previous_hash: None,
            hash: BlockHash::ZERO,
            body: body(""),
        };
        let mut bytes = block_bytes(&block);
        // timestamp 5 is encoded as 0x05 right after key 0x01; widen it to 0x18 0x05.
        let pos = bytes.windows(2).position(|w| w == [0x01, 0x05]).unwrap();
        bytes.splice(pos + 1..pos + 2, [0x18, 0x05]);

        assert!(matches!(
            decode_block(&bytes),
            Err(CoreError::MalformedBlock(_))
        ));
    }
}

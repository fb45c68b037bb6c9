//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use starledger_core::{Block, Blake3Hasher, BlockHash, PendingBlock, GENESIS_MARKER};

use crate::fixtures::Wallet;

/// Generate a wallet seed that is always a valid secp256k1 private key.
pub fn wallet_seed() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(1u8..=0x7f)
}

/// Generate a deterministic wallet.
pub fn wallet() -> impl Strategy<Value = Wallet> {
    wallet_seed().prop_map(Wallet::from_seed)
}

/// Generate a `0x` address in lowercase hex.
pub fn address() -> impl Strategy<Value = String> {
    "0x[0-9a-f]{40}".prop_map(String::from)
}

/// Generate a random BlockHash.
pub fn block_hash() -> impl Strategy<Value = BlockHash> {
    any::<[u8; 32]>().prop_map(BlockHash::from_bytes)
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Generate a JSON leaf value.
fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        ".{0,24}".prop_map(Value::String),
    ]
}

/// Generate a star payload: an object with free-form, possibly nested, values.
pub fn star_payload() -> impl Strategy<Value = Value> {
    let value = json_leaf().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    });

    prop::collection::btree_map("[a-z]{1,8}", value, 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

/// Generate a sealed chain of `1..=max_len` blocks with arbitrary payloads.
pub fn chain(max_len: usize) -> impl Strategy<Value = Vec<Block>> {
    (
        timestamp(),
        prop::collection::vec(star_payload(), 0..max_len.max(1)),
    )
        .prop_map(|(start, payloads)| {
            let mut blocks: Vec<Block> = Vec::with_capacity(payloads.len() + 1);
            let genesis = PendingBlock::genesis(GENESIS_MARKER).expect("genesis encodes");
            blocks.push(genesis.seal(0, start, None, &Blake3Hasher));

            for payload in payloads {
                let prev = blocks.last().map(|b| b.hash);
                let height = blocks.len() as u64;
                let pending = PendingBlock::new(&payload).expect("json value encodes");
                blocks.push(pending.seal(height, start + height as i64, prev, &Blake3Hasher));
            }
            blocks
        })
}

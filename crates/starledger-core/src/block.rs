//! Block: the unit of the ledger.
//!
//! A block is sealed exactly once, by the ledger, and never edited after it
//! is committed. Its payload travels as an opaque [`BlockBody`]: the
//! lowercase hex of the UTF-8 JSON serialization of the payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::canonical::{block_bytes, decode_block, hash_input_bytes};
use crate::crypto::Hasher;
use crate::error::CoreError;
use crate::types::BlockHash;

/// The `data` value carried by the genesis block.
pub const GENESIS_MARKER: &str = "Genesis Block";

/// Payload of the genesis block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisPayload {
    pub data: String,
}

impl GenesisPayload {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            data: marker.into(),
        }
    }
}

/// Payload of every non-genesis block: a star claimed by a wallet address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    /// The wallet address that proved ownership.
    pub address: String,
    /// The challenge message that was signed.
    pub message: String,
    /// The wallet's signature over `message`.
    pub signature: String,
    /// Free-form star payload (coordinates, story, ...).
    pub star: serde_json::Value,
}

/// Reversibly encoded block payload.
///
/// The encoded string is part of the hash input, so it is kept exactly as
/// produced and never re-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockBody(String);

impl BlockBody {
    /// Encode a payload: hex of its UTF-8 JSON serialization.
    pub fn encode<T: Serialize + ?Sized>(payload: &T) -> Result<Self, CoreError> {
        let json = serde_json::to_vec(payload).map_err(|e| CoreError::Encoding(e.to_string()))?;
        Ok(Self(hex::encode(json)))
    }

    /// Wrap an already-encoded body (e.g. one loaded from storage).
    ///
    /// No validation is done; decoding reports problems later.
    pub fn from_encoded(encoded: String) -> Self {
        Self(encoded)
    }

    /// The encoded string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the payload into a concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, CoreError> {
        let json = hex::decode(&self.0).map_err(|e| CoreError::MalformedBody(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| CoreError::MalformedBody(e.to_string()))
    }

    /// Decode the payload as untyped JSON.
    pub fn decode_json(&self) -> Result<serde_json::Value, CoreError> {
        self.decode()
    }
}

/// A payload that has been encoded but not yet placed on the chain.
///
/// Height, timestamp and linkage are assigned by the ledger in
/// [`PendingBlock::seal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBlock {
    body: BlockBody,
}

impl PendingBlock {
    /// Encode `payload` into a pending block.
    pub fn new<T: Serialize + ?Sized>(payload: &T) -> Result<Self, CoreError> {
        Ok(Self {
            body: BlockBody::encode(payload)?,
        })
    }

    /// The genesis block payload for the given marker.
    pub fn genesis(marker: &str) -> Result<Self, CoreError> {
        Self::new(&GenesisPayload::new(marker))
    }

    /// The encoded body.
    pub fn body(&self) -> &BlockBody {
        &self.body
    }

    /// Assign position and time, then compute the hash.
    pub fn seal(
        self,
        height: u64,
        timestamp: i64,
        previous_hash: Option<BlockHash>,
        hasher: &dyn Hasher,
    ) -> Block {
        let hash = hasher.digest(&hash_input_bytes(
            previous_hash.as_ref(),
            timestamp,
            height,
            &self.body,
        ));

        Block {
            height,
            timestamp,
            previous_hash,
            hash,
            body: self.body,
        }
    }
}

/// A sealed ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain (0 = genesis).
    pub height: u64,
    /// Commit time, Unix seconds.
    pub timestamp: i64,
    /// Hash of the predecessor (None only for genesis).
    pub previous_hash: Option<BlockHash>,
    /// Digest over all other fields in canonical order.
    pub hash: BlockHash,
    /// Encoded payload.
    pub body: BlockBody,
}

impl Block {
    /// Recompute the hash from the current field values.
    pub fn compute_hash(&self, hasher: &dyn Hasher) -> BlockHash {
        hasher.digest(&hash_input_bytes(
            self.previous_hash.as_ref(),
            self.timestamp,
            self.height,
            &self.body,
        ))
    }

    /// True iff the stored hash matches the recomputed one.
    pub fn verify_self(&self, hasher: &dyn Hasher) -> bool {
        self.compute_hash(hasher) == self.hash
    }

    /// Decode the payload into a concrete type.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T, CoreError> {
        self.body.decode()
    }

    /// Decode the payload as a star record.
    pub fn star_record(&self) -> Result<StarRecord, CoreError> {
        self.decode_body()
    }

    /// Check if this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Persisted canonical encoding (hash included).
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        block_bytes(self)
    }

    /// Decode a block from its persisted canonical encoding.
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_block(bytes)
    }
}

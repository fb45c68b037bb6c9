//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the body encoding and the canonical hash input of a
//! block, so any implementation that reproduces them computes the same
//! block hashes for the same hasher.

use starledger_core::{hash_input_bytes, BlockBody, BlockHash};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Previous block hash, `None` for genesis.
    pub previous_hash: Option<[u8; 32]>,
    /// Commit timestamp, Unix seconds.
    pub timestamp: i64,
    /// Block height.
    pub height: u64,
    /// Payload as compact JSON with sorted keys.
    pub payload_json: &'static str,
    /// Expected hash input bytes (hex).
    pub expected_hash_input: &'static str,
}

const STAR_PAYLOAD: &str = concat!(
    r#"{"address":"0x7e5f4552091a69125d5dfcb7b8c2659029395bdf","#,
    r#""message":"0x7e5f4552091a69125d5dfcb7b8c2659029395bdf:1700000000:starRegistry","#,
    r#""signature":"0x00","#,
    r#""star":{"dec":"-26 29 24.9","ra":"16h 29m 1.0s","story":"Found star using https://www.google.com/sky/"}}"#,
);

const STAR_HASH_INPUT: &str = concat!(
    "a40058201111111111111111111111111111111111111111111111111111111111111111011a",
    "6553f13c02010379020437623232363136343634373236353733373332323361323233303738",
    "3337363533353636333433353335333233303339333136313336333933313332333536343335",
    "3634363636333632333736323338363333323336333533393330333233393333333933353632",
    "3634363632323263323236643635373337333631363736353232336132323330373833373635",
    "3335363633343335333533323330333933313631333633393331333233353634333536343636",
    "3633363233373632333836333332333633353339333033323339333333393335363236343636",
    "3361333133373330333033303330333033303330333033613733373436313732353236353637",
    "3639373337343732373932323263323237333639363736653631373437353732363532323361",
    "3232333037383330333032323263323237333734363137323232336137623232363436353633",
    "3232336132323264333233363230333233393230333233343265333932323263323237323631",
    "3232336132323331333636383230333233393664323033313265333037333232326332323733",
    "3734366637323739323233613232343636663735366536343230373337343631373232303735",
    "3733363936653637323036383734373437303733336132663266373737373737326536373666",
    "3666363736633635326536333666366432663733366237393266323237643764",
);

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "genesis block",
            previous_hash: None,
            timestamp: 1_700_000_000,
            height: 0,
            payload_json: r#"{"data":"Genesis Block"}"#,
            expected_hash_input: concat!(
                "a400f6011a6553f100020003783037623232363436313734363132323361",
                "32323437363536653635373336393733323034323663366636333662323237",
                "64",
            ),
        },
        GoldenVector {
            name: "star record at height 1",
            previous_hash: Some([0x11; 32]),
            timestamp: 1_700_000_060,
            height: 1,
            payload_json: STAR_PAYLOAD,
            expected_hash_input: STAR_HASH_INPUT,
        },
        GoldenVector {
            name: "empty object, negative timestamp",
            previous_hash: Some([
                0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
                0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19,
                0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f,
            ]),
            timestamp: -1,
            height: 23,
            payload_json: "{}",
            expected_hash_input: concat!(
                "a4005820000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
                "01200217036437623764",
            ),
        },
        GoldenVector {
            name: "two-byte height",
            previous_hash: None,
            timestamp: 0,
            height: 24,
            payload_json: r#"{"data":"Genesis Block"}"#,
            expected_hash_input: concat!(
                "a400f60100021818037830376232323634363137343631323233613232343736",
                "3536653635373336393733323034323663366636333662323237",
                "64",
            ),
        },
    ]
}

/// Encode the vector's payload into a block body.
pub fn body_from_vector(vector: &GoldenVector) -> BlockBody {
    let payload: serde_json::Value =
        serde_json::from_str(vector.payload_json).expect("vector payload is valid JSON");
    BlockBody::encode(&payload).expect("JSON value encodes")
}

/// Compute the hash input bytes for a vector.
pub fn hash_input_from_vector(vector: &GoldenVector) -> Vec<u8> {
    let previous = vector.previous_hash.map(BlockHash::from_bytes);
    hash_input_bytes(
        previous.as_ref(),
        vector.timestamp,
        vector.height,
        &body_from_vector(vector),
    )
}

/// Verify all golden vectors.
///
/// Returns a list of failures (empty if all pass).
pub fn verify_all_vectors() -> Vec<String> {
    let mut failures = Vec::new();

    for vector in all_vectors() {
        let body = body_from_vector(&vector);
        if body.as_str() != hex::encode(vector.payload_json) {
            failures.push(format!("{}: body encoding differs", vector.name));
            continue;
        }

        let actual = hex::encode(hash_input_from_vector(&vector));
        if actual != vector.expected_hash_input {
            failures.push(format!(
                "{}: expected {}, got {}",
                vector.name, vector.expected_hash_input, actual
            ));
        }
    }

    failures
}

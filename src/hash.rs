//! xxHash-based content hashing for asset payloads
//!
//! The library records the hash when an asset is created and checks it
//! again whenever the payload is read back.

use xxhash_rust::xxh3::xxh3_64;

/// Hash of an in-memory payload
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Whether `data` still matches a previously recorded hash
pub fn verify(data: &[u8], expected: u64) -> bool {
    content_hash(data) == expected
}

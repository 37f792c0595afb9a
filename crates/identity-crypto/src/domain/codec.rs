//! Canonical bincode encoding for wire structures.
//!
//! Integers are fixed-width and decoding rejects trailing bytes, so a value
//! has exactly one accepted encoding.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Largest structure accepted from the wire.
pub const MAX_DECODE_BYTES: u64 = 64 * 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .with_limit(MAX_DECODE_BYTES)
}

/// Encode a value.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, bincode::Error> {
    options().serialize(value)
}

/// Decode a value, failing unless `bytes` is exactly one encoding of it.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, bincode::Error> {
    options().deserialize(bytes)
}

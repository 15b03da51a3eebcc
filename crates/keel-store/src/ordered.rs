// Fixed-width big-endian integer encoding for store keys.
//
// INVARIANT: byte order of encoded keys equals numeric order of the
// values. Time-indexed queues depend on this to make ascending store
// iteration equal chronological iteration.

use thiserror::Error;

/// Width in bytes of an encoded `u64` key segment.
pub const U64_KEY_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderedCodecError {
    #[error("expected {expected} key bytes, got {got}")]
    BadWidth { expected: usize, got: usize },
}

/// Encode a `u64` so that byte-lexicographic order equals numeric order.
pub fn encode_u64(value: u64) -> [u8; U64_KEY_LEN] {
    value.to_be_bytes()
}

/// Decode a key segment produced by [`encode_u64`].
pub fn decode_u64(bytes: &[u8]) -> Result<u64, OrderedCodecError> {
    let arr: [u8; U64_KEY_LEN] = bytes.try_into().map_err(|_| OrderedCodecError::BadWidth {
        expected: U64_KEY_LEN,
        got: bytes.len(),
    })?;
    Ok(u64::from_be_bytes(arr))
}

// Store key layout.
//
// Every key starts with a single prefix byte so unrelated records never
// interleave in a scan. Unlock-queue keys embed the completion time as
// fixed-width big-endian bytes, so ascending store iteration over the
// queue prefix is chronological iteration.

use keel_store::ordered;

/// Key of the total-liquid-staked counter (singleton).
pub const TOTAL_LIQUID_STAKED_KEY: [u8; 1] = [0x11];

/// Prefix for per-validator ledger records.
pub const VALIDATOR_PREFIX: u8 = 0x21;

/// Prefix for tokenize-share lock flags.
pub const TOKENIZE_LOCK_PREFIX: u8 = 0x31;

/// Prefix for the pending tokenize-share unlock queue.
pub const UNLOCK_QUEUE_PREFIX: u8 = 0x32;

/// Sentinel byte stored under a tokenize-share lock key.
pub const TOKENIZE_LOCK_VALUE: u8 = 0x01;

pub fn validator_key(operator: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + operator.len());
    key.push(VALIDATOR_PREFIX);
    key.extend_from_slice(operator);
    key
}

pub fn tokenize_lock_key(address: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + address.len());
    key.push(TOKENIZE_LOCK_PREFIX);
    key.extend_from_slice(address);
    key
}

/// Queue bucket key for all unlocks completing at `unix_secs`.
pub fn unlock_queue_key(unix_secs: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + ordered::U64_KEY_LEN);
    key.push(UNLOCK_QUEUE_PREFIX);
    key.extend_from_slice(&ordered::encode_u64(unix_secs));
    key
}

/// Completion time embedded in an unlock-queue key, if the key has the
/// expected shape.
pub fn unlock_queue_time(key: &[u8]) -> Option<u64> {
    if key.len() != 1 + ordered::U64_KEY_LEN || key[0] != UNLOCK_QUEUE_PREFIX {
        return None;
    }
    ordered::decode_u64(&key[1..]).ok()
}

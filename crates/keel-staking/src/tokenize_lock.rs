// TOKENIZE-SHARE LOCKS
//
// Per-account locks that block re-tokenizing shares, plus a time-bucketed
// queue that lifts each lock one unbonding period after release was
// requested. The queue is drained once per block, after all user-initiated
// transitions, so unlocks are a function of block time alone and never of
// transaction order within a block.

use log::debug;
use serde::{Deserialize, Serialize};

use keel_store::KvStore;

use crate::keys;
use crate::liquid_stake::FatalError;
use crate::params::LiquidStakingParams;

/// Addresses waiting on the same completion time, in insertion order.
/// Duplicates are allowed; each entry unlocks independently, and unlocking
/// an already-unlocked address is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUnlocks {
    pub addresses: Vec<Vec<u8>>,
}

/// Lock an account out of tokenizing shares. Idempotent.
pub fn add_tokenize_shares_lock<S: KvStore>(store: &mut S, address: &[u8]) {
    store.set(
        &keys::tokenize_lock_key(address),
        &[keys::TOKENIZE_LOCK_VALUE],
    );
}

/// Lift the tokenize-share lock for an account. Idempotent.
pub fn remove_tokenize_shares_lock<S: KvStore>(store: &mut S, address: &[u8]) {
    store.delete(&keys::tokenize_lock_key(address));
}

/// True if the account currently holds a tokenize-share lock. Only the
/// exact one-byte sentinel counts as locked; any other stored shape reads
/// as unlocked.
pub fn is_tokenize_shares_locked<S: KvStore>(store: &S, address: &[u8]) -> bool {
    match store.get(&keys::tokenize_lock_key(address)) {
        Some(value) => value == [keys::TOKENIZE_LOCK_VALUE],
        None => false,
    }
}

/// The bucket of pending unlocks completing at `completion_secs`, or an
/// empty bucket if none is stored.
pub fn pending_unlocks_at<S: KvStore>(
    store: &S,
    completion_secs: u64,
) -> Result<PendingUnlocks, FatalError> {
    let key = keys::unlock_queue_key(completion_secs);
    match store.get(&key) {
        None => Ok(PendingUnlocks::default()),
        Some(bytes) => bincode::deserialize(&bytes).map_err(|_| FatalError::CorruptValue {
            key: hex::encode(&key),
        }),
    }
}

fn set_pending_unlocks<S: KvStore>(store: &mut S, completion_secs: u64, pending: &PendingUnlocks) {
    let bytes = bincode::serialize(pending).expect("pending unlock encoding failed");
    store.set(&keys::unlock_queue_key(completion_secs), &bytes);
}

/// Queue `address` for unlock one unbonding period from `now_secs`, and
/// return the completion time. The lock itself stays in place until the
/// queue entry matures.
pub fn queue_tokenize_shares_unlock<S: KvStore>(
    store: &mut S,
    params: &LiquidStakingParams,
    address: &[u8],
    now_secs: u64,
) -> Result<u64, FatalError> {
    let completion_secs = now_secs.saturating_add(params.unbonding_seconds);
    let mut pending = pending_unlocks_at(store, completion_secs)?;
    pending.addresses.push(address.to_vec());
    set_pending_unlocks(store, completion_secs, &pending);
    debug!(
        "queued tokenize-share unlock for {} at {}",
        hex::encode(address),
        completion_secs
    );
    Ok(completion_secs)
}

/// Drain every queue bucket with a completion time at or before `now_secs`
/// and lift the corresponding locks. The upper bound is inclusive: a
/// bucket scheduled for exactly `now_secs` matures in this call. Run once
/// per block, after all user-initiated transitions.
pub fn remove_expired_tokenize_share_locks<S: KvStore>(
    store: &mut S,
    now_secs: u64,
) -> Result<(), FatalError> {
    let start = [keys::UNLOCK_QUEUE_PREFIX];
    let end = keys::unlock_queue_key(now_secs);
    for (key, value) in store.range(&start, &end) {
        let pending: PendingUnlocks =
            bincode::deserialize(&value).map_err(|_| FatalError::CorruptValue {
                key: hex::encode(&key),
            })?;
        debug!(
            "unlocking {} tokenize-share lock(s) matured at or before {}",
            pending.addresses.len(),
            now_secs
        );
        for address in &pending.addresses {
            remove_tokenize_shares_lock(store, address);
        }
        store.delete(&key);
    }
    Ok(())
}

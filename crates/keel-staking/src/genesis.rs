// Module genesis.
//
// The global counter is born here: reading it uninitialized is fatal, so
// every chain (fresh or migrated) runs init before the first state
// transition. Parameters themselves are host-governed and
// not persisted in this store; the genesis document carries them so the
// host can seed its own parameter source.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use keel_store::KvStore;

use crate::keys;
use crate::liquid_stake::{set_total_liquid_staked, total_liquid_staked, FatalError};
use crate::params::{LiquidStakingParams, ParamsError};
use crate::tokenize_lock::{add_tokenize_shares_lock, PendingUnlocks};
use crate::validator::{set_validator, Validator};

/// A queue bucket in exportable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUnlockBucket {
    pub completion_secs: u64,
    pub addresses: Vec<Vec<u8>>,
}

/// Full module state at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: LiquidStakingParams,
    pub total_liquid_staked_tokens: u128,
    pub validators: Vec<Validator>,
    pub tokenize_share_locks: Vec<Vec<u8>>,
    pub pending_unlocks: Vec<PendingUnlockBucket>,
}

impl GenesisState {
    /// An empty ledger under the given parameters.
    pub fn new(params: LiquidStakingParams) -> Self {
        GenesisState {
            params,
            total_liquid_staked_tokens: 0,
            validators: Vec::new(),
            tokenize_share_locks: Vec::new(),
            pending_unlocks: Vec::new(),
        }
    }
}

impl Default for GenesisState {
    fn default() -> Self {
        GenesisState::new(LiquidStakingParams::default())
    }
}

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

/// Write the genesis state into an empty store.
pub fn init_genesis<S: KvStore>(store: &mut S, genesis: &GenesisState) -> Result<(), GenesisError> {
    genesis.params.validate()?;
    set_total_liquid_staked(store, genesis.total_liquid_staked_tokens);
    for validator in &genesis.validators {
        set_validator(store, validator);
    }
    for address in &genesis.tokenize_share_locks {
        add_tokenize_shares_lock(store, address);
    }
    for bucket in &genesis.pending_unlocks {
        let pending = PendingUnlocks {
            addresses: bucket.addresses.clone(),
        };
        let bytes = bincode::serialize(&pending).expect("pending unlock encoding failed");
        store.set(&keys::unlock_queue_key(bucket.completion_secs), &bytes);
    }
    Ok(())
}

/// Read the full module state back out of the store. Buckets come out in
/// chronological order, which is the store's key order.
pub fn export_genesis<S: KvStore>(
    store: &S,
    params: LiquidStakingParams,
) -> Result<GenesisState, FatalError> {
    let total_liquid_staked_tokens = total_liquid_staked(store)?;

    let mut validators = Vec::new();
    for (key, value) in store.prefix(&[keys::VALIDATOR_PREFIX]) {
        let validator: Validator =
            bincode::deserialize(&value).map_err(|_| FatalError::CorruptValue {
                key: hex::encode(&key),
            })?;
        validators.push(validator);
    }

    let tokenize_share_locks = store
        .prefix(&[keys::TOKENIZE_LOCK_PREFIX])
        .into_iter()
        .map(|(key, _)| key[1..].to_vec())
        .collect();

    let mut pending_unlocks = Vec::new();
    for (key, value) in store.prefix(&[keys::UNLOCK_QUEUE_PREFIX]) {
        let completion_secs = keys::unlock_queue_time(&key).ok_or(FatalError::CorruptValue {
            key: hex::encode(&key),
        })?;
        let pending: PendingUnlocks =
            bincode::deserialize(&value).map_err(|_| FatalError::CorruptValue {
                key: hex::encode(&key),
            })?;
        pending_unlocks.push(PendingUnlockBucket {
            completion_secs,
            addresses: pending.addresses,
        });
    }

    Ok(GenesisState {
        params,
        total_liquid_staked_tokens,
        validators,
        tokenize_share_locks,
        pending_unlocks,
    })
}

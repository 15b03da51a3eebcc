use keel_store::KvStore;
use serde::{Deserialize, Serialize};

use crate::keys;
use crate::liquid_stake::FatalError;

/// Per-validator ledger fields tracked by this module. The operator id is
/// the host's unique validator identity; everything else the host knows
/// about a validator lives outside this store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Operator identity bytes
    pub operator: Vec<u8>,
    /// Shares delegated through liquid-staking providers
    pub total_liquid_shares: u128,
    /// Shares self-bonded by the validator's operator
    pub total_validator_bond_shares: u128,
}

impl Validator {
    /// A validator with an empty ledger.
    pub fn new(operator: Vec<u8>) -> Self {
        Validator {
            operator,
            total_liquid_shares: 0,
            total_validator_bond_shares: 0,
        }
    }
}

/// Fetch a validator's ledger record. A record that fails to decode means
/// the store is corrupt, which is fatal.
pub fn get_validator<S: KvStore>(
    store: &S,
    operator: &[u8],
) -> Result<Option<Validator>, FatalError> {
    let key = keys::validator_key(operator);
    match store.get(&key) {
        None => Ok(None),
        Some(bytes) => bincode::deserialize(&bytes)
            .map(Some)
            .map_err(|_| FatalError::CorruptValue {
                key: hex::encode(&key),
            }),
    }
}

/// Persist a validator's ledger record.
pub fn set_validator<S: KvStore>(store: &mut S, validator: &Validator) {
    let bytes = bincode::serialize(validator).expect("validator record encoding failed");
    store.set(&keys::validator_key(&validator.operator), &bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_store::MemoryStore;

    #[test]
    fn test_validator_roundtrip() {
        let mut store = MemoryStore::new();
        let validator = Validator {
            operator: vec![1, 2, 3],
            total_liquid_shares: 480,
            total_validator_bond_shares: 100,
        };
        set_validator(&mut store, &validator);
        assert_eq!(get_validator(&store, &[1, 2, 3]).unwrap(), Some(validator));
    }

    #[test]
    fn test_missing_validator_is_none() {
        let store = MemoryStore::new();
        assert_eq!(get_validator(&store, &[9, 9]).unwrap(), None);
    }

    #[test]
    fn test_corrupt_record_is_fatal() {
        let mut store = MemoryStore::new();
        store.set(&keys::validator_key(&[7]), &[0xff]);
        assert!(matches!(
            get_validator(&store, &[7]),
            Err(FatalError::CorruptValue { .. })
        ));
    }
}

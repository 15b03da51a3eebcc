// LIQUID STAKE ACCOUNTING
//
// Tracks how much of the bonded pool is liquid (tokenized shares or
// ICA-originated delegations) versus self-bonded, and enforces two
// independent caps on that ratio: a global cap on the liquid fraction of
// the bonded pool, and a per-validator cap tied to the validator's own
// self-bond.
//
// SAFETY INVARIANTS:
// 1. The global counter and the per-validator share fields are mutated
//    only through the functions below, in call order, on a single thread
//    per block.
// 2. The global counter is maintained whether or not the global cap is
//    enforced; only the cap check is skipped while disabled, so enabling
//    the cap later needs no backfill.
// 3. A subtraction below zero means a caller bypassed the mutators or the
//    store is corrupt. Replicas must halt identically on that, never wrap.

use log::debug;
use thiserror::Error;

use keel_store::KvStore;

use crate::keys;
use crate::params::{LiquidStakingParams, BPS_DENOMINATOR};
use crate::validator::{set_validator, Validator};

/// Faults that must halt the node. These indicate store corruption or a
/// caller bypassing the safe mutators; recovering by guesswork risks a
/// consensus-breaking divergence between replicas.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FatalError {
    #[error("total liquid staked tokens was never initialized")]
    TotalLiquidStakedUninitialized,
    #[error("corrupt store value under key {key}")]
    CorruptValue { key: String },
    #[error("{field} underflow: {current} - {delta}")]
    BalanceUnderflow {
        field: &'static str,
        current: u128,
        delta: u128,
    },
}

/// Business-rule rejections. The enclosing state transition aborts and
/// discards its speculative writes; the node keeps running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StakingError {
    #[error("global liquid staking cap exceeded")]
    GlobalCapExceeded,
    #[error("validator liquid shares would exceed the validator bond cap")]
    ValidatorBondCapExceeded,
    #[error("insufficient validator bond shares")]
    InsufficientValidatorBondShares,
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

/// Host view of the account registry, used to classify liquid-staking
/// providers.
pub trait AccountLookup {
    /// True if `address` belongs to a module account.
    fn is_module_account(&self, address: &[u8]) -> bool;
}

/// Length of ICA host-generated account addresses.
const PROVIDER_ADDRESS_LEN: usize = 32;

/// A liquid staking provider is a module account with a 32-byte address
/// (ICA host accounts); ordinary accounts use shorter addresses.
pub fn account_is_liquid_staking_provider(
    accounts: &impl AccountLookup,
    address: &[u8],
) -> bool {
    accounts.is_module_account(address) && address.len() == PROVIDER_ADDRESS_LEN
}

/// Read the total outstanding tokens owned by liquid staking providers.
/// The counter is written at genesis; a missing value means the module was
/// never initialized.
pub fn total_liquid_staked<S: KvStore>(store: &S) -> Result<u128, FatalError> {
    let bytes = store
        .get(&keys::TOTAL_LIQUID_STAKED_KEY)
        .ok_or(FatalError::TotalLiquidStakedUninitialized)?;
    bincode::deserialize(&bytes).map_err(|_| FatalError::CorruptValue {
        key: hex::encode(keys::TOTAL_LIQUID_STAKED_KEY),
    })
}

/// Overwrite the total-liquid-staked counter.
pub fn set_total_liquid_staked<S: KvStore>(store: &mut S, tokens: u128) {
    let bytes = bincode::serialize(&tokens).expect("counter encoding failed");
    store.set(&keys::TOTAL_LIQUID_STAKED_KEY, &bytes);
}

/// Whether adding `candidate_tokens` of liquid stake would push the liquid
/// fraction of the bonded pool above the global cap. Pure read; the bonded
/// pool balance is the host's bank-side view of total bonded stake.
///
/// An empty pool cannot host liquid stake: with a zero denominator the
/// candidate is rejected exactly when the resulting liquid amount is
/// non-zero.
pub fn exceeds_global_liquid_cap(
    params: &LiquidStakingParams,
    liquid_staked: u128,
    bonded_pool_tokens: u128,
    candidate_tokens: u128,
) -> bool {
    let liquid = liquid_staked.saturating_add(candidate_tokens);
    let total = bonded_pool_tokens.saturating_add(candidate_tokens);
    if total == 0 {
        return liquid > 0;
    }
    // liquid / total > cap, compared cross-multiplied so no division
    // or rounding exists on a consensus path.
    liquid.saturating_mul(BPS_DENOMINATOR) > total.saturating_mul(params.global_cap_bps as u128)
}

/// Whether adding `candidate_shares` of liquid delegation would push the
/// validator's liquid shares past its bond-factor cap. Pure read.
pub fn exceeds_validator_bond_cap(
    params: &LiquidStakingParams,
    validator: &Validator,
    candidate_shares: u128,
) -> bool {
    let max_liquid = validator
        .total_validator_bond_shares
        .saturating_mul(params.bond_factor_bps as u128);
    validator
        .total_liquid_shares
        .saturating_add(candidate_shares)
        .saturating_mul(BPS_DENOMINATOR)
        > max_liquid
}

/// Increment the global liquid stake counter, rejecting the increase if it
/// would breach the global cap. The counter is maintained even while the
/// cap is disabled; only the check is skipped.
pub fn safely_increase_total_liquid_staked<S: KvStore>(
    store: &mut S,
    params: &LiquidStakingParams,
    bonded_pool_tokens: u128,
    amount: u128,
) -> Result<(), StakingError> {
    let current = total_liquid_staked(store)?;
    if params.global_cap_enabled
        && exceeds_global_liquid_cap(params, current, bonded_pool_tokens, amount)
    {
        debug!(
            "rejected liquid stake increase of {}: global cap {} bps",
            amount, params.global_cap_bps
        );
        return Err(StakingError::GlobalCapExceeded);
    }
    set_total_liquid_staked(store, current.saturating_add(amount));
    Ok(())
}

/// Decrement the global liquid stake counter. Caps only gate growth, so no
/// check runs here; a decrease below zero is a fatal fault.
pub fn decrease_total_liquid_staked<S: KvStore>(
    store: &mut S,
    amount: u128,
) -> Result<(), FatalError> {
    let current = total_liquid_staked(store)?;
    let updated = current
        .checked_sub(amount)
        .ok_or(FatalError::BalanceUnderflow {
            field: "total_liquid_staked_tokens",
            current,
            delta: amount,
        })?;
    set_total_liquid_staked(store, updated);
    Ok(())
}

/// Increment a validator's liquid shares, rejecting the delegation if it
/// would exceed the bond-factor cap. No-op while the bond factor is
/// disabled, so callers keep a single call site per delegation event.
pub fn safely_increase_validator_liquid_shares<S: KvStore>(
    store: &mut S,
    params: &LiquidStakingParams,
    validator: &mut Validator,
    shares: u128,
) -> Result<(), StakingError> {
    if !params.bond_factor_enabled {
        return Ok(());
    }
    if exceeds_validator_bond_cap(params, validator, shares) {
        debug!(
            "rejected {} liquid shares on validator {}: bond factor {} bps",
            shares,
            hex::encode(&validator.operator),
            params.bond_factor_bps
        );
        return Err(StakingError::ValidatorBondCapExceeded);
    }
    validator.total_liquid_shares = validator.total_liquid_shares.saturating_add(shares);
    set_validator(store, validator);
    Ok(())
}

/// Decrement a validator's liquid shares. No-op while the bond factor is
/// disabled; a decrease below zero is a fatal fault.
pub fn decrease_validator_liquid_shares<S: KvStore>(
    store: &mut S,
    params: &LiquidStakingParams,
    validator: &mut Validator,
    shares: u128,
) -> Result<(), FatalError> {
    if !params.bond_factor_enabled {
        return Ok(());
    }
    let updated = validator
        .total_liquid_shares
        .checked_sub(shares)
        .ok_or(FatalError::BalanceUnderflow {
            field: "total_liquid_shares",
            current: validator.total_liquid_shares,
            delta: shares,
        })?;
    validator.total_liquid_shares = updated;
    set_validator(store, validator);
    Ok(())
}

/// Decrement a validator's self-bond, rejecting the withdrawal if the
/// existing liquid shares would exceed the cap implied by the reduced
/// bond. No-op while the bond factor is disabled.
pub fn safely_decrease_validator_bond<S: KvStore>(
    store: &mut S,
    params: &LiquidStakingParams,
    validator: &mut Validator,
    shares: u128,
) -> Result<(), StakingError> {
    if !params.bond_factor_enabled {
        return Ok(());
    }
    let reduced_bond = validator
        .total_validator_bond_shares
        .checked_sub(shares)
        .ok_or(FatalError::BalanceUnderflow {
            field: "total_validator_bond_shares",
            current: validator.total_validator_bond_shares,
            delta: shares,
        })?;
    let max_liquid = reduced_bond.saturating_mul(params.bond_factor_bps as u128);
    if validator
        .total_liquid_shares
        .saturating_mul(BPS_DENOMINATOR)
        > max_liquid
    {
        debug!(
            "rejected bond decrease of {} on validator {}: liquid shares {} above reduced cap",
            shares,
            hex::encode(&validator.operator),
            validator.total_liquid_shares
        );
        return Err(StakingError::InsufficientValidatorBondShares);
    }
    validator.total_validator_bond_shares = reduced_bond;
    set_validator(store, validator);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_store::MemoryStore;
    use proptest::prelude::*;

    fn params() -> LiquidStakingParams {
        LiquidStakingParams {
            global_cap_enabled: true,
            global_cap_bps: 3_000,
            bond_factor_enabled: true,
            bond_factor_bps: 50_000, // 5x
            unbonding_seconds: 500,
        }
    }

    struct Accounts {
        module_accounts: Vec<Vec<u8>>,
    }

    impl AccountLookup for Accounts {
        fn is_module_account(&self, address: &[u8]) -> bool {
            self.module_accounts.iter().any(|a| a == address)
        }
    }

    #[test]
    fn test_uninitialized_counter_is_fatal() {
        let store = MemoryStore::new();
        assert_eq!(
            total_liquid_staked(&store),
            Err(FatalError::TotalLiquidStakedUninitialized)
        );
    }

    #[test]
    fn test_corrupt_counter_is_fatal() {
        let mut store = MemoryStore::new();
        store.set(&keys::TOTAL_LIQUID_STAKED_KEY, &[1, 2, 3]);
        assert!(matches!(
            total_liquid_staked(&store),
            Err(FatalError::CorruptValue { .. })
        ));
    }

    #[test]
    fn test_counter_roundtrip() {
        let mut store = MemoryStore::new();
        set_total_liquid_staked(&mut store, 42);
        assert_eq!(total_liquid_staked(&store), Ok(42));
    }

    #[test]
    fn test_empty_pool_rejects_any_liquid_stake() {
        let p = params();
        assert!(exceeds_global_liquid_cap(&p, 1, 0, 0));
        assert!(!exceeds_global_liquid_cap(&p, 0, 0, 0));
    }

    #[test]
    fn test_decrease_below_zero_is_fatal() {
        let mut store = MemoryStore::new();
        set_total_liquid_staked(&mut store, 10);
        let err = decrease_total_liquid_staked(&mut store, 11).unwrap_err();
        assert!(matches!(err, FatalError::BalanceUnderflow { .. }));
        // A failed decrease leaves the counter untouched.
        assert_eq!(total_liquid_staked(&store), Ok(10));
    }

    #[test]
    fn test_counter_maintained_while_cap_disabled() {
        let mut store = MemoryStore::new();
        set_total_liquid_staked(&mut store, 0);
        let p = LiquidStakingParams {
            global_cap_enabled: false,
            ..params()
        };
        // With the cap disabled, any amount passes and is still recorded.
        safely_increase_total_liquid_staked(&mut store, &p, 0, 1_000_000).unwrap();
        assert_eq!(total_liquid_staked(&store), Ok(1_000_000));
        decrease_total_liquid_staked(&mut store, 400_000).unwrap();
        assert_eq!(total_liquid_staked(&store), Ok(600_000));
    }

    #[test]
    fn test_validator_mutators_noop_while_factor_disabled() {
        let mut store = MemoryStore::new();
        let p = LiquidStakingParams {
            bond_factor_enabled: false,
            ..params()
        };
        let mut validator = Validator::new(vec![1]);
        safely_increase_validator_liquid_shares(&mut store, &p, &mut validator, 10).unwrap();
        decrease_validator_liquid_shares(&mut store, &p, &mut validator, 10).unwrap();
        safely_decrease_validator_bond(&mut store, &p, &mut validator, 10).unwrap();
        assert_eq!(validator.total_liquid_shares, 0);
        assert_eq!(validator.total_validator_bond_shares, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_liquid_share_underflow_is_fatal() {
        let mut store = MemoryStore::new();
        let p = params();
        let mut validator = Validator::new(vec![1]);
        validator.total_liquid_shares = 5;
        let err = decrease_validator_liquid_shares(&mut store, &p, &mut validator, 6).unwrap_err();
        assert!(matches!(err, FatalError::BalanceUnderflow { .. }));
        assert_eq!(validator.total_liquid_shares, 5);
    }

    #[test]
    fn test_provider_requires_module_account_and_length() {
        let provider = vec![7u8; 32];
        let short_module = vec![7u8; 20];
        let plain = vec![9u8; 32];
        let accounts = Accounts {
            module_accounts: vec![provider.clone(), short_module.clone()],
        };
        assert!(account_is_liquid_staking_provider(&accounts, &provider));
        assert!(!account_is_liquid_staking_provider(&accounts, &short_module));
        assert!(!account_is_liquid_staking_provider(&accounts, &plain));
    }

    proptest! {
        // Raising the candidate can only move the check toward rejection.
        #[test]
        fn global_cap_check_is_monotonic(
            liquid in 0u128..1_000_000,
            pool in 0u128..1_000_000,
            a in 0u128..1_000_000,
            b in 0u128..1_000_000,
        ) {
            let p = params();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            if exceeds_global_liquid_cap(&p, liquid, pool, lo) {
                prop_assert!(exceeds_global_liquid_cap(&p, liquid, pool, hi));
            }
        }

        #[test]
        fn bond_cap_check_is_monotonic(
            bond in 0u128..1_000_000,
            liquid in 0u128..1_000_000,
            a in 0u128..1_000_000,
            b in 0u128..1_000_000,
        ) {
            let p = params();
            let validator = Validator {
                operator: vec![1],
                total_liquid_shares: liquid,
                total_validator_bond_shares: bond,
            };
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            if exceeds_validator_bond_cap(&p, &validator, lo) {
                prop_assert!(exceeds_validator_bond_cap(&p, &validator, hi));
            }
        }
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Denominator for basis-point ratios.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Default global liquid staking cap: 25% of the bonded pool.
pub const DEFAULT_GLOBAL_CAP_BPS: u32 = 2_500;

/// Default validator bond factor: 250x the validator's self-bonded shares.
pub const DEFAULT_BOND_FACTOR_BPS: u32 = 2_500_000;

/// Default unbonding period: 21 days.
pub const DEFAULT_UNBONDING_SECONDS: u64 = 21 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("global liquid staking cap {0} bps exceeds 10000")]
    GlobalCapTooLarge(u32),
    #[error("validator bond factor must be non-zero while enforced")]
    ZeroBondFactor,
    #[error("unbonding period must be non-zero")]
    ZeroUnbondingPeriod,
}

/// Module parameters, supplied by the host on every state transition.
/// Governance owns how they are sourced; this crate only reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidStakingParams {
    /// Whether the global liquid staking cap is enforced
    pub global_cap_enabled: bool,
    /// Maximum liquid fraction of the bonded pool, in basis points
    pub global_cap_bps: u32,
    /// Whether the validator bond factor is enforced
    pub bond_factor_enabled: bool,
    /// Liquid-share multiple of self-bonded shares, in basis points
    /// (10000 = 1x)
    pub bond_factor_bps: u32,
    /// Delay before a queued tokenize-share unlock matures, in seconds
    pub unbonding_seconds: u64,
}

impl Default for LiquidStakingParams {
    fn default() -> Self {
        LiquidStakingParams {
            global_cap_enabled: true,
            global_cap_bps: DEFAULT_GLOBAL_CAP_BPS,
            bond_factor_enabled: true,
            bond_factor_bps: DEFAULT_BOND_FACTOR_BPS,
            unbonding_seconds: DEFAULT_UNBONDING_SECONDS,
        }
    }
}

impl LiquidStakingParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.global_cap_bps > BPS_DENOMINATOR as u32 {
            return Err(ParamsError::GlobalCapTooLarge(self.global_cap_bps));
        }
        if self.bond_factor_enabled && self.bond_factor_bps == 0 {
            return Err(ParamsError::ZeroBondFactor);
        }
        if self.unbonding_seconds == 0 {
            return Err(ParamsError::ZeroUnbondingPeriod);
        }
        Ok(())
    }
}

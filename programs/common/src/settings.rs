//! Pool settings

use crate::error::PoolError;
use crate::types::{Bps, Timestamp};
use pool_model::math::BPS_DENOMINATOR;
use pool_model::SECONDS_PER_DAY;
use serde::{Deserialize, Serialize};

/// Pool configuration chosen at creation
///
/// Fees are in bps, durations in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Maximum total assets accepted through deposits
    pub max_capacity: u128,
    /// Pool closes at this timestamp
    pub end_date: Timestamp,
    /// Fee (in shares) charged on every withdraw request
    pub request_fee_bps: Bps,
    /// Fee (in shares) charged on cancelled request shares
    pub request_cancellation_fee_bps: Bps,
    /// Fraction of liquid assets releasable per period
    pub withdraw_gate_bps: Bps,
    /// Length of one withdraw period
    pub withdraw_request_period_duration: u64,
    /// First-loss capital needed to activate the pool
    pub first_loss_initial_minimum: u128,
    /// Flat fee paid to the admin every `fixed_fee_interval`
    #[serde(default)]
    pub fixed_fee: u128,
    #[serde(default)]
    pub fixed_fee_interval: u64,
    /// Slice of loan interest paid to the fee balance
    #[serde(default)]
    pub service_fee_bps: Bps,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_capacity: 10_000_000_000_000,
            end_date: 0,
            request_fee_bps: 500,
            request_cancellation_fee_bps: 100,
            withdraw_gate_bps: 10_000,
            withdraw_request_period_duration: 30 * SECONDS_PER_DAY,
            first_loss_initial_minimum: 100_000,
            fixed_fee: 0,
            fixed_fee_interval: 0,
            service_fee_bps: 0,
        }
    }
}

fn valid_bps(bps: Bps) -> bool {
    bps <= BPS_DENOMINATOR
}

impl PoolSettings {
    /// Check every field is in range
    pub fn validate(&self) -> Result<(), PoolError> {
        if !valid_bps(self.request_fee_bps)
            || !valid_bps(self.request_cancellation_fee_bps)
            || !valid_bps(self.withdraw_gate_bps)
            || !valid_bps(self.service_fee_bps)
        {
            return Err(PoolError::InvalidSettings);
        }
        if self.withdraw_request_period_duration == 0 {
            return Err(PoolError::InvalidSettings);
        }
        if self.fixed_fee > 0 && self.fixed_fee_interval == 0 {
            return Err(PoolError::InvalidSettings);
        }
        Ok(())
    }

    pub fn check_bps(bps: Bps) -> Result<(), PoolError> {
        if valid_bps(bps) {
            Ok(())
        } else {
            Err(PoolError::InvalidSettings)
        }
    }
}

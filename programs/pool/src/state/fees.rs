//! Fee accounting: fixed admin fee schedule and service fees sliced off interest

use pool_model::math::{add_u128, bps_of, sub_u128};
use tranche_common::{PoolError, Timestamp};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeState {
    /// Next time a fixed fee may be claimed (set on activation)
    pub fixed_fee_due_date: Option<Timestamp>,
    pub total_fixed_fees_claimed: u128,
    /// Service fees held for the admin, outside the liquid reserve
    pub service_fees: u128,
    pub total_service_fees: u128,
}

impl FeeState {
    /// Start the fixed fee schedule
    pub fn start(&mut self, activated_at: Timestamp, interval: u64) {
        if interval > 0 {
            self.fixed_fee_due_date = Some(activated_at.saturating_add(interval));
        }
    }

    /// Claim one fixed fee if one is due; advances the schedule one interval
    pub fn claim_fixed(&mut self, fee: u128, interval: u64, now: Timestamp) -> Result<u128, PoolError> {
        match self.fixed_fee_due_date {
            Some(due) if fee > 0 && due <= now => {
                self.fixed_fee_due_date = Some(due.saturating_add(interval));
                self.total_fixed_fees_claimed = add_u128(self.total_fixed_fees_claimed, fee);
                Ok(fee)
            }
            _ => Err(PoolError::FeeNotDue),
        }
    }

    /// Slice the service fee off an interest payment
    ///
    /// Returns `(fee, interest_to_pool)`.
    pub fn take_service_fee(&mut self, interest: u128, service_fee_bps: u128) -> (u128, u128) {
        let fee = bps_of(interest, service_fee_bps);
        self.service_fees = add_u128(self.service_fees, fee);
        self.total_service_fees = add_u128(self.total_service_fees, fee);
        (fee, sub_u128(interest, fee))
    }

    pub fn withdraw_service_fees(&mut self, amount: u128) -> Result<(), PoolError> {
        if amount == 0 {
            return Err(PoolError::InvalidAmount);
        }
        if self.service_fees < amount {
            return Err(PoolError::InsufficientBalance);
        }
        self.service_fees -= amount;
        Ok(())
    }
}

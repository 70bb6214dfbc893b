//! Liquidity vault: the pool's liquid reserve of the liquidity asset

use pool_model::math::{add_u128, sub_u128};
use tranche_common::PoolError;

/// Liquid reserve, part of which is earmarked for admitted withdrawals
///
/// Earmarked funds are reserved for redeemable shares and can only leave
/// through settlement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiquidityVault {
    /// Total liquid balance
    pub balance: u128,
    /// Reserved for withdrawals already admitted
    pub earmarked: u128,
}

impl LiquidityVault {
    /// Liquid balance not earmarked
    pub fn available(&self) -> u128 {
        sub_u128(self.balance, self.earmarked)
    }

    pub fn deposit(&mut self, amount: u128) {
        self.balance = add_u128(self.balance, amount);
    }

    /// Withdraw from the unearmarked part
    pub fn withdraw(&mut self, amount: u128) -> Result<(), PoolError> {
        if self.available() < amount {
            return Err(PoolError::InsufficientLiquidity);
        }
        self.balance = sub_u128(self.balance, amount);
        Ok(())
    }

    /// Reserve `amount` for admitted withdrawals
    pub fn earmark(&mut self, amount: u128) -> Result<(), PoolError> {
        if self.available() < amount {
            return Err(PoolError::InsufficientLiquidity);
        }
        self.earmarked = add_u128(self.earmarked, amount);
        Ok(())
    }

    /// Pay out earmarked funds on settlement
    pub fn release_earmarked(&mut self, amount: u128) -> Result<(), PoolError> {
        if self.earmarked < amount || self.balance < amount {
            return Err(PoolError::InsufficientLiquidity);
        }
        self.earmarked -= amount;
        self.balance -= amount;
        Ok(())
    }
}

//! Loans funded by the pool

use arrayvec::ArrayVec;
use pool_model::math::{add_u128, sub_u128};
use tranche_common::{Address, PoolError, Timestamp};

/// Maximum concurrently funded loans
pub const MAX_ACTIVE_LOANS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundedLoan {
    pub loan: Address,
    /// Principal still out on this loan
    pub outstanding: u128,
    pub funded_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanBook {
    active: ArrayVec<FundedLoan, MAX_ACTIVE_LOANS>,
    /// Principal written off by defaults
    pub total_defaults: u128,
}

impl LoanBook {
    pub fn get(&self, loan: &Address) -> Option<&FundedLoan> {
        self.active.iter().find(|l| &l.loan == loan)
    }

    pub fn contains(&self, loan: &Address) -> bool {
        self.get(loan).is_some()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FundedLoan> {
        self.active.iter()
    }

    /// Sum of principal currently lent out
    pub fn outstanding_principal(&self) -> u128 {
        self.active
            .iter()
            .fold(0u128, |acc, l| add_u128(acc, l.outstanding))
    }

    pub fn fund(&mut self, loan: Address, principal: u128, now: Timestamp) -> Result<(), PoolError> {
        if self.contains(&loan) {
            return Err(PoolError::InvalidLoanState);
        }
        self.active
            .try_push(FundedLoan {
                loan,
                outstanding: principal,
                funded_at: now,
            })
            .map_err(|_| PoolError::InvalidLoanState)
    }

    /// Retire repaid principal; drops the loan once nothing is outstanding
    ///
    /// Returns the principal actually retired.
    pub fn repay(&mut self, loan: &Address, principal: u128) -> Result<u128, PoolError> {
        let idx = self
            .active
            .iter()
            .position(|l| &l.loan == loan)
            .ok_or(PoolError::InvalidLoanState)?;

        let entry = &mut self.active[idx];
        let retired = principal.min(entry.outstanding);
        entry.outstanding = sub_u128(entry.outstanding, retired);
        if entry.outstanding == 0 {
            self.active.remove(idx);
        }
        Ok(retired)
    }

    /// Remove a loan as defaulted; returns the principal written off
    pub fn write_off(&mut self, loan: &Address) -> Result<u128, PoolError> {
        let idx = self
            .active
            .iter()
            .position(|l| &l.loan == loan)
            .ok_or(PoolError::InvalidLoanState)?;

        let removed = self.active.remove(idx);
        self.total_defaults = add_u128(self.total_defaults, removed.outstanding);
        Ok(removed.outstanding)
    }
}

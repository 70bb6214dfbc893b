//! Conversion math: NAV, share/asset conversion, accrued interest, capacity
//!
//! Every function here is pure. Division by total assets is guarded by the
//! `Insolvent` check; everything else saturates.

use crate::math::*;

/// Seconds in one day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// The only failure conversion math can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Share supply is nonzero but there are no assets backing it
    Insolvent,
}

/// Rounding direction for a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// Pool lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Initialized,
    Active,
    Closed,
}

/// Loan instrument lifecycle as reported by the loan itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanState {
    Requested,
    Collateralized,
    Canceled,
    Defaulted,
    Funded,
    Matured,
    Active,
}

impl LoanState {
    /// Loan may receive funds from the pool
    pub fn is_fundable(&self) -> bool {
        matches!(self, LoanState::Requested | LoanState::Collateralized)
    }

    /// Loan holds pool funds and can be written off
    pub fn is_defaultable(&self) -> bool {
        matches!(self, LoanState::Funded | LoanState::Active)
    }
}

/// Read-only facts about a loan needed to estimate accrued interest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTerms {
    pub principal: u128,
    pub payment: u128,
    pub payments_remaining: u64,
    /// Timestamp the next payment is due
    pub payment_due_date: u64,
    /// Length of one payment period in seconds
    pub payment_period: u64,
    pub state: LoanState,
}

/// Net asset value inputs for a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Nav {
    pub total_assets: u128,
    pub total_supply: u128,
}

impl Nav {
    pub fn new(total_assets: u128, total_supply: u128) -> Self {
        Self { total_assets, total_supply }
    }

    /// NAV with earmarked withdrawals removed from both sides
    ///
    /// Assets already promised to redeemable shares stop earning, and those
    /// shares stop counting toward the supply new depositors buy into.
    pub fn available(&self, withdrawable_assets: u128, redeemable_shares: u128) -> Self {
        Self {
            total_assets: sub_u128(self.total_assets, withdrawable_assets),
            total_supply: sub_u128(self.total_supply, redeemable_shares),
        }
    }

    fn check_solvent(&self) -> Result<(), MathError> {
        if self.total_supply > 0 && self.total_assets == 0 {
            return Err(MathError::Insolvent);
        }
        Ok(())
    }
}

/// input * numerator / denominator with explicit rounding
///
/// Returns `input` unchanged when the denominator is zero. Callers that need
/// the solvency check go through [`shares_for_assets`] / [`assets_for_shares`].
pub fn convert(input: u128, numerator: u128, denominator: u128, rounding: Rounding) -> u128 {
    if denominator == 0 {
        return input;
    }
    match rounding {
        Rounding::Down => mul_div_down(input, numerator, denominator),
        Rounding::Up => mul_div_up(input, numerator, denominator),
    }
}

/// Shares worth `assets` at this NAV (1:1 while no shares exist)
pub fn shares_for_assets(assets: u128, nav: &Nav, rounding: Rounding) -> Result<u128, MathError> {
    nav.check_solvent()?;
    if nav.total_supply == 0 {
        return Ok(assets);
    }
    Ok(convert(assets, nav.total_supply, nav.total_assets, rounding))
}

/// Assets backing `shares` at this NAV (1:1 while no shares exist)
pub fn assets_for_shares(shares: u128, nav: &Nav, rounding: Rounding) -> Result<u128, MathError> {
    nav.check_solvent()?;
    if nav.total_supply == 0 {
        return Ok(shares);
    }
    Ok(convert(shares, nav.total_assets, nav.total_supply, rounding))
}

/// Interest a single loan has accrued but not yet paid
///
/// Straight-line within the current payment period. A late loan accrues each
/// fully elapsed unpaid period in full plus a pro-rated part of the current
/// one, capped at the payments that remain.
pub fn expected_interest(loan: &LoanTerms, now: u64) -> u128 {
    if loan.state != LoanState::Active || loan.payment_period == 0 || loan.payments_remaining == 0 {
        return 0;
    }

    let period_start = loan.payment_due_date.saturating_sub(loan.payment_period);
    if now <= period_start {
        return 0;
    }

    let elapsed = now - period_start;
    let full_periods = (elapsed / loan.payment_period) as u128;
    let partial = (elapsed % loan.payment_period) as u128;

    let accrued = add_u128(
        mul_u128(full_periods, loan.payment),
        mul_div_down(loan.payment, partial, loan.payment_period as u128),
    );
    let cap = mul_u128(loan.payments_remaining as u128, loan.payment);

    min_u128(accrued, cap)
}

/// Sum of [`expected_interest`] over a set of loans
pub fn total_expected_interest<'a, I>(loans: I, now: u64) -> u128
where
    I: IntoIterator<Item = &'a LoanTerms>,
{
    loans
        .into_iter()
        .fold(0u128, |acc, l| add_u128(acc, expected_interest(l, now)))
}

/// Total assets = liquid + outstanding principal + accrued interest
pub fn total_assets(liquid_reserve: u128, outstanding_principal: u128, accrued_interest: u128) -> u128 {
    add_u128(add_u128(liquid_reserve, outstanding_principal), accrued_interest)
}

/// Remaining deposit room; zero unless the pool is Active
pub fn max_deposit(state: LifecycleState, capacity: u128, current_assets: u128) -> u128 {
    if state != LifecycleState::Active {
        return 0;
    }
    sub_u128(capacity, current_assets)
}

/// Withdraw period index since activation
///
/// `None` before activation (or when the clock reads earlier than activation).
pub fn period_at(activated_at: Option<u64>, now: u64, period_duration: u64) -> Option<u64> {
    let start = activated_at?;
    if now < start || period_duration == 0 {
        return None;
    }
    Some((now - start) / period_duration)
}

//! Pool ledger: every piece of state an entry point may mutate
//!
//! The ledger is plain data and cheap enough to clone, which is how entry
//! points stay atomic: they work on a copy and only commit it once every
//! external call succeeded.

use super::{FeeState, FirstLossState, LiquidityVault, LoanBook, ShareLedger, WithdrawController};
use pool_model::{self, period_at, total_assets, AdmissionParams, LifecycleState, Nav, Snapshot, SECONDS_PER_DAY};
use tranche_common::{Address, PoolError, PoolSettings, Timestamp};

/// Gate applied once the pool is closed
pub const CLOSED_GATE_BPS: u128 = 10_000;

/// Inputs an entry point reads from collaborators before touching the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub now: Timestamp,
    /// Interest accrued on funded loans at `now`
    pub accrued_interest: u128,
    /// First-loss escrow balance at `now`
    pub first_loss_balance: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolLedger {
    /// The pool's own token account
    pub address: Address,
    pub admin: Address,
    pub settings: PoolSettings,
    pub activated_at: Option<Timestamp>,
    pub vault: LiquidityVault,
    pub shares: ShareLedger,
    pub withdraws: WithdrawController,
    pub loans: LoanBook,
    pub first_loss: FirstLossState,
    pub fees: FeeState,
}

impl PoolLedger {
    pub fn new(address: Address, admin: Address, settings: PoolSettings) -> Result<Self, PoolError> {
        settings.validate()?;
        Ok(Self {
            address,
            admin,
            settings,
            activated_at: None,
            vault: LiquidityVault::default(),
            shares: ShareLedger::default(),
            withdraws: WithdrawController::default(),
            loans: LoanBook::default(),
            first_loss: FirstLossState::default(),
            fees: FeeState::default(),
        })
    }

    pub fn lifecycle(&self, now: Timestamp) -> LifecycleState {
        if now >= self.settings.end_date {
            LifecycleState::Closed
        } else if self.activated_at.is_some() {
            LifecycleState::Active
        } else {
            LifecycleState::Initialized
        }
    }

    pub fn require_state(&self, now: Timestamp, expected: LifecycleState) -> Result<(), PoolError> {
        if self.lifecycle(now) != expected {
            return Err(PoolError::InvalidLifecycleState);
        }
        Ok(())
    }

    pub fn require_admin(&self, caller: &Address) -> Result<(), PoolError> {
        if caller != &self.admin {
            return Err(PoolError::Unauthorized);
        }
        Ok(())
    }

    /// Withdraw period length; closed pools shrink it to at most one day
    pub fn period_duration(&self, now: Timestamp) -> u64 {
        let duration = self.settings.withdraw_request_period_duration;
        if self.lifecycle(now) == LifecycleState::Closed {
            duration.min(SECONDS_PER_DAY)
        } else {
            duration
        }
    }

    pub fn current_period(&self, now: Timestamp) -> Option<u64> {
        period_at(self.activated_at, now, self.period_duration(now))
    }

    /// Effective withdraw gate; 100% once closed
    pub fn withdraw_gate(&self, now: Timestamp) -> u128 {
        if self.lifecycle(now) == LifecycleState::Closed {
            CLOSED_GATE_BPS
        } else {
            self.settings.withdraw_gate_bps
        }
    }

    pub fn total_assets(&self, ctx: &Context) -> u128 {
        total_assets(
            self.vault.balance,
            self.loans.outstanding_principal(),
            ctx.accrued_interest,
        )
    }

    /// NAV less everything already earmarked for admitted withdrawals
    pub fn available_nav(&self, ctx: &Context) -> Nav {
        Nav::new(self.total_assets(ctx), self.shares.total_supply).available(
            self.withdraws.global.withdrawable_assets,
            self.withdraws.global.redeemable_shares,
        )
    }

    /// Liquid assets not earmarked: the gate basis and the fundable amount
    pub fn liquidity_pool_assets(&self) -> u128 {
        self.vault.available()
    }

    /// Activate once the first-loss escrow reaches its minimum
    pub fn maybe_activate(&mut self, first_loss_balance: u128, now: Timestamp) -> bool {
        if self.activated_at.is_some() || first_loss_balance < self.settings.first_loss_initial_minimum {
            return false;
        }
        self.activated_at = Some(now);
        self.fees.start(now, self.settings.fixed_fee_interval);
        log::info!("Pool {} activated at {}", self.address, now);
        true
    }

    /// Run the admission engine for the current period
    ///
    /// # Returns
    /// The snapshot written, if anything was eligible. Errors only when the
    /// clock reads before activation or before the last processed period.
    pub fn run_admission(&mut self, ctx: &Context) -> Result<Option<Snapshot>, PoolError> {
        let period = self.current_period(ctx.now).ok_or(PoolError::ClockAnomaly)?;

        let params = AdmissionParams {
            period,
            available_liquidity: self.liquidity_pool_assets(),
            gate_bps: self.withdraw_gate(ctx.now),
            nav: self.available_nav(ctx),
            full_release: self.lifecycle(ctx.now) == LifecycleState::Closed,
        };

        let snapshot = self.withdraws.run_admission(&params)?;
        if let Some(s) = &snapshot {
            self.vault.earmark(s.served_assets)?;
            log::info!(
                "Snapshot period {}: served {} of {} eligible shares for {} assets{}",
                s.period,
                s.served_shares,
                s.eligible_shares,
                s.served_assets,
                if s.full_release { " (full release)" } else { "" }
            );
        }
        Ok(snapshot)
    }

    /// Admission run performed at the start of every entry point
    ///
    /// Skipped before activation; only a backwards clock is an error here.
    pub fn lazy_admission(&mut self, ctx: &Context) -> Result<Option<Snapshot>, PoolError> {
        match self.activated_at {
            None => Ok(None),
            Some(_) => self.run_admission(ctx),
        }
    }

    /// Largest deposit accepted right now
    pub fn max_deposit(&self, ctx: &Context) -> u128 {
        let available = self.available_nav(ctx).total_assets;
        pool_model::max_deposit(self.lifecycle(ctx.now), self.settings.max_capacity, available)
    }
}

//! Pool entry points
//!
//! [`Pool`] owns the ledger and the collaborators. Every mutating entry
//! point follows the same sequence:
//!
//! 1. Read the context (accrued interest, first-loss balance) from collaborators
//! 2. Clone the ledger and run the lazy admission crank on the clone
//! 3. Run the instruction handler on the clone
//! 4. Execute the handler's external effect, if any
//! 5. Commit the clone
//!
//! Any failure before step 5 leaves the pool exactly as it was.

use crate::instructions::{self, Effect};
use crate::state::{check_withdraw_invariants, Context, PoolLedger};
use pool_model::{
    assets_for_shares, interest_bearing_balance, shares_for_assets, total_expected_interest,
    ClaimOutcome, GlobalWithdrawState, LifecycleState, Rounding, Snapshot, WithdrawState,
};
use std::borrow::Cow;
use std::collections::BTreeMap;
use tranche_common::{
    AccessPredicate, Address, Bps, FirstLossBuffer, LoanInstrument, PoolError, PoolResult,
    PoolSettings, Timestamp, TokenTransfer,
};

pub use crate::instructions::{CancelReceipt, DefaultReport, PaymentReceipt, RequestReceipt};

/// Collaborators a pool is wired to at creation
pub struct Collaborators {
    pub token: Box<dyn TokenTransfer>,
    pub access: Box<dyn AccessPredicate>,
    pub first_loss: Box<dyn FirstLossBuffer>,
}

pub struct Pool {
    ledger: PoolLedger,
    token: Box<dyn TokenTransfer>,
    access: Box<dyn AccessPredicate>,
    first_loss: Box<dyn FirstLossBuffer>,
    /// Instruments of the loans currently in the book
    loans: BTreeMap<Address, Box<dyn LoanInstrument>>,
}

impl Pool {
    /// Create a pool in the Initialized state
    ///
    /// # Arguments
    /// * `address` - The pool's own token account
    /// * `admin` - Address allowed to run admin entry points
    /// * `settings` - Validated before anything is created
    pub fn new(
        address: Address,
        admin: Address,
        settings: PoolSettings,
        collaborators: Collaborators,
    ) -> PoolResult<Self> {
        let ledger = PoolLedger::new(address, admin, settings)?;
        log::info!("Pool {} created, admin {}", address, admin);
        Ok(Self {
            ledger,
            token: collaborators.token,
            access: collaborators.access,
            first_loss: collaborators.first_loss,
            loans: BTreeMap::new(),
        })
    }

    pub fn ledger(&self) -> &PoolLedger {
        &self.ledger
    }

    pub fn address(&self) -> Address {
        self.ledger.address
    }

    pub fn admin(&self) -> Address {
        self.ledger.admin
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.ledger.settings
    }

    fn context(&self, now: Timestamp) -> Context {
        let terms: Vec<_> = self
            .ledger
            .loans
            .iter()
            .filter_map(|l| self.loans.get(&l.loan))
            .map(|loan| loan.terms())
            .collect();
        Context {
            now,
            accrued_interest: total_expected_interest(terms.iter(), now),
            first_loss_balance: self.first_loss.balance(),
        }
    }

    fn execute(&mut self, effect: Effect) -> PoolResult<()> {
        match effect {
            Effect::Transfer { from, to, amount } => self.token.transfer(&from, &to, amount)?,
            Effect::FirstLossDeposit { from, amount } => self.first_loss.deposit(&from, amount)?,
            Effect::FirstLossWithdraw { to, amount } => self.first_loss.withdraw(&to, amount)?,
        }
        Ok(())
    }

    /// Run `handler` atomically after the lazy crank
    fn transact<T, F>(&mut self, now: Timestamp, handler: F) -> PoolResult<T>
    where
        F: FnOnce(&mut PoolLedger, &Context) -> PoolResult<(T, Option<Effect>)>,
    {
        let ctx = self.context(now);
        let mut next = self.ledger.clone();
        next.lazy_admission(&ctx)?;

        let (out, effect) = handler(&mut next, &ctx)?;
        if let Some(effect) = effect {
            self.execute(effect)?;
        }

        self.ledger = next;
        Ok(out)
    }

    fn require_allowed(&self, who: &Address) -> PoolResult<()> {
        if !self.access.is_allowed(who) {
            return Err(PoolError::Unauthorized);
        }
        Ok(())
    }

    /// Ledger as it would read after the lazy crank at `now`, without committing
    fn view(&self, now: Timestamp) -> (Cow<'_, PoolLedger>, Context) {
        let ctx = self.context(now);
        let pending = self.ledger.activated_at.is_some()
            && self.ledger.current_period(now) != self.ledger.withdraws.last_admission_period;
        if !pending {
            return (Cow::Borrowed(&self.ledger), ctx);
        }

        let mut next = self.ledger.clone();
        match next.lazy_admission(&ctx) {
            Ok(_) => (Cow::Owned(next), ctx),
            Err(_) => (Cow::Borrowed(&self.ledger), ctx),
        }
    }

    // ------------------------------------------------------------------
    // Lender entry points
    // ------------------------------------------------------------------

    /// Deposit `assets`, minting shares to `receiver` (must be the caller)
    pub fn deposit(&mut self, now: Timestamp, caller: &Address, assets: u128, receiver: &Address) -> PoolResult<u128> {
        self.require_allowed(caller)?;
        self.transact(now, |l, ctx| {
            let (shares, effect) = instructions::process_deposit(l, ctx, caller, assets, receiver)?;
            Ok((shares, Some(effect)))
        })
    }

    /// Mint exactly `shares` to `receiver` (must be the caller); returns assets paid
    pub fn mint(&mut self, now: Timestamp, caller: &Address, shares: u128, receiver: &Address) -> PoolResult<u128> {
        self.require_allowed(caller)?;
        self.transact(now, |l, ctx| {
            let (assets, effect) = instructions::process_mint(l, ctx, caller, shares, receiver)?;
            Ok((assets, Some(effect)))
        })
    }

    pub fn request_redeem(&mut self, now: Timestamp, caller: &Address, shares: u128) -> PoolResult<RequestReceipt> {
        self.require_allowed(caller)?;
        self.transact(now, |l, ctx| {
            Ok((instructions::process_request_redeem(l, ctx, caller, shares)?, None))
        })
    }

    pub fn request_withdraw(&mut self, now: Timestamp, caller: &Address, assets: u128) -> PoolResult<RequestReceipt> {
        self.require_allowed(caller)?;
        self.transact(now, |l, ctx| {
            Ok((instructions::process_request_withdraw(l, ctx, caller, assets)?, None))
        })
    }

    pub fn cancel_redeem_request(&mut self, now: Timestamp, caller: &Address, shares: u128) -> PoolResult<CancelReceipt> {
        self.transact(now, |l, ctx| {
            Ok((instructions::process_cancel_redeem_request(l, ctx, caller, shares)?, None))
        })
    }

    pub fn cancel_withdraw_request(&mut self, now: Timestamp, caller: &Address, assets: u128) -> PoolResult<CancelReceipt> {
        self.transact(now, |l, ctx| {
            Ok((instructions::process_cancel_withdraw_request(l, ctx, caller, assets)?, None))
        })
    }

    /// Redeem admitted shares; returns assets paid
    pub fn redeem(
        &mut self,
        now: Timestamp,
        caller: &Address,
        shares: u128,
        receiver: &Address,
        owner: &Address,
    ) -> PoolResult<u128> {
        self.transact(now, |l, _| {
            let (assets, effect) = instructions::process_redeem(l, caller, shares, receiver, owner)?;
            Ok((assets, Some(effect)))
        })
    }

    /// Withdraw admitted assets; returns shares burned
    pub fn withdraw(
        &mut self,
        now: Timestamp,
        caller: &Address,
        assets: u128,
        receiver: &Address,
        owner: &Address,
    ) -> PoolResult<u128> {
        self.transact(now, |l, _| {
            let (shares, effect) = instructions::process_withdraw(l, caller, assets, receiver, owner)?;
            Ok((shares, Some(effect)))
        })
    }

    // ------------------------------------------------------------------
    // Permissionless
    // ------------------------------------------------------------------

    /// Run the admission engine for the current period
    ///
    /// Unlike the lazy crank this fails with `ClockAnomaly` before activation.
    pub fn crank(&mut self, now: Timestamp) -> PoolResult<Option<Snapshot>> {
        let ctx = self.context(now);
        let mut next = self.ledger.clone();
        let snapshot = instructions::process_crank(&mut next, &ctx)?;
        self.ledger = next;
        Ok(snapshot)
    }

    /// Replay up to `limit` snapshots for `owner`
    pub fn claim_snapshots(&mut self, now: Timestamp, owner: &Address, limit: u64) -> PoolResult<ClaimOutcome> {
        self.transact(now, |l, _| {
            Ok((instructions::process_claim_snapshots(l, owner, limit)?, None))
        })
    }

    /// Crank, then bring `owner` fully up to date
    pub fn crank_and_claim(&mut self, now: Timestamp, owner: &Address) -> PoolResult<WithdrawState> {
        self.crank(now)?;
        self.claim_snapshots(now, owner, u64::MAX)?;
        Ok(self.ledger.withdraws.stored_state(owner))
    }

    // ------------------------------------------------------------------
    // Admin: loans
    // ------------------------------------------------------------------

    /// Fund `loan` with its principal
    pub fn fund_loan(&mut self, now: Timestamp, caller: &Address, loan: Box<dyn LoanInstrument>) -> PoolResult<()> {
        let address = loan.address();
        let terms = loan.terms();
        self.transact(now, |l, ctx| {
            let effect = instructions::process_fund_loan(l, ctx, caller, &address, &terms)?;
            Ok(((), Some(effect)))
        })?;
        self.loans.insert(address, loan);
        Ok(())
    }

    /// Payment pushed by a funded loan (the caller)
    pub fn receive_loan_payment(
        &mut self,
        now: Timestamp,
        caller: &Address,
        interest: u128,
        principal: u128,
    ) -> PoolResult<PaymentReceipt> {
        let receipt = self.transact(now, |l, _| {
            let (receipt, effect) = instructions::process_loan_payment(l, caller, interest, principal)?;
            Ok((receipt, Some(effect)))
        })?;
        if receipt.retired {
            self.loans.remove(caller);
        }
        Ok(receipt)
    }

    pub fn default_loan(&mut self, now: Timestamp, caller: &Address, loan: &Address) -> PoolResult<DefaultReport> {
        let terms = self
            .loans
            .get(loan)
            .map(|l| l.terms())
            .ok_or(PoolError::InvalidLoanState)?;
        let report = self.transact(now, |l, ctx| {
            instructions::process_default_loan(l, ctx, caller, loan, &terms)
        })?;
        self.loans.remove(loan);
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Admin: first loss and fees
    // ------------------------------------------------------------------

    /// Fund the first-loss escrow; returns whether the pool activated
    pub fn deposit_first_loss(&mut self, now: Timestamp, caller: &Address, amount: u128) -> PoolResult<bool> {
        self.transact(now, |l, ctx| {
            let (activated, effect) = instructions::process_deposit_first_loss(l, ctx, caller, amount)?;
            Ok((activated, Some(effect)))
        })
    }

    pub fn withdraw_first_loss(&mut self, now: Timestamp, caller: &Address, amount: u128, receiver: &Address) -> PoolResult<()> {
        self.transact(now, |l, ctx| {
            let effect = instructions::process_withdraw_first_loss(l, ctx, caller, amount, receiver)?;
            Ok(((), Some(effect)))
        })
    }

    pub fn claim_fixed_fee(&mut self, now: Timestamp, caller: &Address) -> PoolResult<u128> {
        self.transact(now, |l, ctx| {
            let (fee, effect) = instructions::process_claim_fixed_fee(l, ctx, caller)?;
            Ok((fee, Some(effect)))
        })
    }

    pub fn withdraw_fees(&mut self, now: Timestamp, caller: &Address, amount: u128, receiver: &Address) -> PoolResult<()> {
        self.transact(now, |l, _| {
            let effect = instructions::process_withdraw_fees(l, caller, amount, receiver)?;
            Ok(((), Some(effect)))
        })
    }

    // ------------------------------------------------------------------
    // Admin: settings
    // ------------------------------------------------------------------

    pub fn set_request_fee(&mut self, now: Timestamp, caller: &Address, bps: Bps) -> PoolResult<()> {
        self.transact(now, |l, ctx| Ok((instructions::process_set_request_fee(l, ctx, caller, bps)?, None)))
    }

    pub fn set_request_cancellation_fee(&mut self, now: Timestamp, caller: &Address, bps: Bps) -> PoolResult<()> {
        self.transact(now, |l, ctx| {
            Ok((instructions::process_set_request_cancellation_fee(l, ctx, caller, bps)?, None))
        })
    }

    pub fn set_withdraw_gate(&mut self, now: Timestamp, caller: &Address, bps: Bps) -> PoolResult<()> {
        self.transact(now, |l, ctx| Ok((instructions::process_set_withdraw_gate(l, ctx, caller, bps)?, None)))
    }

    pub fn set_pool_capacity(&mut self, now: Timestamp, caller: &Address, capacity: u128) -> PoolResult<()> {
        self.transact(now, |l, ctx| {
            Ok((instructions::process_set_pool_capacity(l, ctx, caller, capacity)?, None))
        })
    }

    pub fn set_pool_end_date(&mut self, now: Timestamp, caller: &Address, end_date: Timestamp) -> PoolResult<()> {
        self.transact(now, |l, ctx| {
            Ok((instructions::process_set_pool_end_date(l, ctx, caller, end_date)?, None))
        })
    }

    pub fn set_service_fee_bps(&mut self, now: Timestamp, caller: &Address, bps: Bps) -> PoolResult<()> {
        self.transact(now, |l, ctx| Ok((instructions::process_set_service_fee_bps(l, ctx, caller, bps)?, None)))
    }

    pub fn set_fixed_fee(&mut self, now: Timestamp, caller: &Address, fee: u128, interval: u64) -> PoolResult<()> {
        self.transact(now, |l, ctx| {
            Ok((instructions::process_set_fixed_fee(l, ctx, caller, fee, interval)?, None))
        })
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn lifecycle(&self, now: Timestamp) -> LifecycleState {
        self.ledger.lifecycle(now)
    }

    pub fn current_period(&self, now: Timestamp) -> Option<u64> {
        self.ledger.current_period(now)
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.shares.total_supply
    }

    pub fn balance_of(&self, owner: &Address) -> u128 {
        self.ledger.shares.balance_of(owner)
    }

    /// Balance of `owner` not yet frozen as redeemable
    pub fn interest_bearing_balance(&self, now: Timestamp, owner: &Address) -> u128 {
        let (l, _) = self.view(now);
        interest_bearing_balance(l.shares.balance_of(owner), &l.withdraws.current_state(owner))
    }

    pub fn current_expected_interest(&self, now: Timestamp) -> u128 {
        self.context(now).accrued_interest
    }

    pub fn total_assets(&self, now: Timestamp) -> u128 {
        self.ledger.total_assets(&self.context(now))
    }

    /// `(total available assets, total available supply)` after the lazy crank
    pub fn available_nav(&self, now: Timestamp) -> (u128, u128) {
        let (l, ctx) = self.view(now);
        let nav = l.available_nav(&ctx);
        (nav.total_assets, nav.total_supply)
    }

    pub fn liquidity_pool_assets(&self, now: Timestamp) -> u128 {
        self.view(now).0.liquidity_pool_assets()
    }

    pub fn convert_to_shares(&self, now: Timestamp, assets: u128) -> PoolResult<u128> {
        let (l, ctx) = self.view(now);
        Ok(shares_for_assets(assets, &l.available_nav(&ctx), Rounding::Down)?)
    }

    pub fn convert_to_assets(&self, now: Timestamp, shares: u128) -> PoolResult<u128> {
        let (l, ctx) = self.view(now);
        Ok(assets_for_shares(shares, &l.available_nav(&ctx), Rounding::Down)?)
    }

    /// Zero for participants the access predicate rejects
    pub fn max_deposit(&self, now: Timestamp, receiver: &Address) -> u128 {
        if !self.access.is_allowed(receiver) {
            return 0;
        }
        let (l, ctx) = self.view(now);
        l.max_deposit(&ctx)
    }

    pub fn max_mint(&self, now: Timestamp, receiver: &Address) -> PoolResult<u128> {
        if !self.access.is_allowed(receiver) {
            return Ok(0);
        }
        let (l, ctx) = self.view(now);
        instructions::max_mint(&l, &ctx)
    }

    pub fn preview_deposit(&self, now: Timestamp, assets: u128) -> PoolResult<u128> {
        let (l, ctx) = self.view(now);
        instructions::preview_deposit(&l, &ctx, assets)
    }

    pub fn preview_mint(&self, now: Timestamp, shares: u128) -> PoolResult<u128> {
        let (l, ctx) = self.view(now);
        instructions::preview_mint(&l, &ctx, shares)
    }

    pub fn max_redeem_request(&self, now: Timestamp, owner: &Address) -> u128 {
        instructions::max_redeem_request(&self.view(now).0, owner)
    }

    pub fn max_withdraw_request(&self, now: Timestamp, owner: &Address) -> PoolResult<u128> {
        let (l, ctx) = self.view(now);
        instructions::max_withdraw_request(&l, &ctx, owner)
    }

    /// Shares debited (including the fee) for requesting `shares`
    pub fn preview_redeem_request(&self, shares: u128) -> u128 {
        instructions::preview_redeem_request(&self.ledger, shares)
    }

    pub fn preview_withdraw_request(&self, now: Timestamp, assets: u128) -> PoolResult<u128> {
        let (l, ctx) = self.view(now);
        instructions::preview_withdraw_request(&l, &ctx, assets)
    }

    pub fn max_request_cancellation(&self, now: Timestamp, owner: &Address) -> u128 {
        instructions::max_request_cancellation(&self.view(now).0, owner)
    }

    pub fn max_redeem(&self, now: Timestamp, owner: &Address) -> u128 {
        instructions::max_redeem(&self.view(now).0, owner)
    }

    pub fn max_withdraw(&self, now: Timestamp, owner: &Address) -> u128 {
        instructions::max_withdraw(&self.view(now).0, owner)
    }

    pub fn preview_redeem(&self, now: Timestamp, owner: &Address, shares: u128) -> u128 {
        instructions::preview_redeem(&self.view(now).0, owner, shares)
    }

    pub fn preview_withdraw(&self, now: Timestamp, owner: &Address, assets: u128) -> u128 {
        instructions::preview_withdraw(&self.view(now).0, owner, assets)
    }

    /// `owner` has snapshots left to replay
    pub fn claim_required(&self, now: Timestamp, owner: &Address) -> bool {
        instructions::claim_required(&self.view(now).0, owner)
    }

    pub fn unclaimed_snapshots(&self, now: Timestamp, owner: &Address) -> u64 {
        self.view(now).0.withdraws.unclaimed_snapshots(owner)
    }

    /// Withdrawal state of `owner` with pending history folded in
    pub fn withdraw_state(&self, now: Timestamp, owner: &Address) -> WithdrawState {
        self.view(now).0.withdraws.current_state(owner)
    }

    pub fn global_withdraw_state(&self, now: Timestamp) -> GlobalWithdrawState {
        self.view(now).0.withdraws.global
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        self.ledger.withdraws.snapshots()
    }

    pub fn service_fees(&self) -> u128 {
        self.ledger.fees.service_fees
    }

    pub fn first_loss_balance(&self) -> u128 {
        self.first_loss.balance()
    }

    pub fn is_funded_loan(&self, loan: &Address) -> bool {
        self.ledger.loans.contains(loan)
    }

    /// Withdrawal accounting is consistent with the vault
    pub fn invariants_hold(&self) -> bool {
        check_withdraw_invariants(&self.ledger)
    }
}

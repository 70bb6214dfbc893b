//! Simulated pool wired to in-memory collaborators
//!
//! The keeper drives this the way it would drive a live pool: advance the
//! clock, push scheduled borrower and lender actions, crank, then work the
//! claim backlog so nobody falls behind the snapshot history.

use crate::config::{Config, LenderConfig, LoanConfig};
use crate::priority_queue::{Backlog, ClaimQueue};
use crate::report::{LenderReport, Report};
use anyhow::{Context, Result};
use tranche_common::memory::{MemoryEscrow, MemoryLoan, MemoryToken};
use tranche_common::{Address, AllowAll, LifecycleState, LoanInstrument, PoolError, Timestamp};
use tranche_pool::{Collaborators, Pool};

pub struct Lender {
    pub name: String,
    pub address: Address,
    config: LenderConfig,
    requested: bool,
    pub deposited: u128,
    pub redeemed: u128,
}

struct SimLoan {
    name: String,
    config: LoanConfig,
    loan: MemoryLoan,
    settled: bool,
}

/// What a tick did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub period: u64,
    pub snapshot_written: bool,
    pub claims: usize,
    pub redeemed: u128,
}

pub struct Scenario {
    pool: Pool,
    token: MemoryToken,
    admin: Address,
    lenders: Vec<Lender>,
    loans: Vec<SimLoan>,
    queue: ClaimQueue,
    claim_batch: u64,
    claims_per_tick: usize,
    now: Timestamp,
    ticks: u64,
    closed_at: Option<Timestamp>,
}

impl Scenario {
    /// Create the pool, fund first loss, take deposits and fund the loans at `start`
    pub fn new(config: &Config, start: Timestamp) -> Result<Self> {
        let token = MemoryToken::new();
        let admin = Address::new_unique();
        let collaborators = Collaborators {
            token: Box::new(token.clone()),
            access: Box::new(AllowAll),
            first_loss: Box::new(MemoryEscrow::new(&token)),
        };
        let mut pool = Pool::new(Address::new_unique(), admin, config.pool.settings(), collaborators)
            .context("Failed to create pool")?;

        token.mint(&admin, config.first_loss as u128);
        pool.deposit_first_loss(start, &admin, config.first_loss as u128)
            .context("Failed to deposit first loss")?;
        if pool.lifecycle(start) != LifecycleState::Active {
            anyhow::bail!("first loss {} does not activate the pool", config.first_loss);
        }

        let mut lenders = Vec::with_capacity(config.lenders.len());
        for lc in &config.lenders {
            let address = Address::new_unique();
            let deposit = lc.deposit as u128;
            token.mint(&address, deposit);
            pool.deposit(start, &address, deposit, &address)
                .context(format!("Deposit for {} failed", lc.name))?;
            log::info!("{} ({}) deposited {}", lc.name, address, deposit);
            lenders.push(Lender {
                name: lc.name.clone(),
                address,
                config: lc.clone(),
                requested: false,
                deposited: deposit,
                redeemed: 0,
            });
        }

        let mut loans = Vec::with_capacity(config.loans.len());
        for lc in &config.loans {
            let loan = MemoryLoan::new(lc.principal as u128, lc.payment as u128, lc.payments, lc.payment_period);
            pool.fund_loan(start, &admin, loan.instrument())
                .context(format!("Funding {} failed", lc.name))?;
            loan.activate(start);
            // Borrower's interest budget on top of the drawn principal
            token.mint(&loan.address(), (lc.payment as u128).saturating_mul(lc.payments as u128));
            loans.push(SimLoan {
                name: lc.name.clone(),
                config: lc.clone(),
                loan,
                settled: false,
            });
        }

        Ok(Self {
            pool,
            token,
            admin,
            lenders,
            loans,
            queue: ClaimQueue::new(),
            claim_batch: config.claim_batch.max(1),
            claims_per_tick: config.claims_per_tick.max(1),
            now: start,
            ticks: 0,
            closed_at: None,
        })
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn lenders(&self) -> &[Lender] {
        &self.lenders
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Advance one withdraw period and run every scheduled action
    pub fn tick(&mut self) -> Result<TickSummary> {
        self.submit_requests();

        let step = self.pool.ledger().period_duration(self.now);
        self.now = self.now.saturating_add(step);
        self.ticks += 1;
        let period = self.pool.current_period(self.now).unwrap_or(0);

        self.service_loans(period);

        // The lazy crank inside a loan payment may already have written it
        self.pool.crank(self.now).context("Crank failed")?;
        let latest = self.pool.snapshots().last().filter(|s| s.period == period);
        let snapshot_written = latest.is_some();
        if let Some(s) = latest {
            log::info!(
                "Period {}: served {}/{} shares ({} assets)",
                period,
                s.served_shares,
                s.eligible_shares,
                s.served_assets
            );
        }

        self.refresh_backlog();
        let claims = self.work_backlog()?;
        let redeemed = self.redeem_ready();

        if let Some(top) = self.queue.peek() {
            log::debug!(
                "Backlog: {} lenders, {} snapshots total, worst {}",
                self.queue.len(),
                self.queue.total_unclaimed(),
                top.unclaimed
            );
        }

        Ok(TickSummary {
            period,
            snapshot_written,
            claims,
            redeemed,
        })
    }

    /// Close the pool at the current time
    pub fn close(&mut self) -> Result<()> {
        self.pool
            .set_pool_end_date(self.now, &self.admin, self.now)
            .context("Failed to close pool")?;
        self.closed_at = Some(self.now);
        log::info!("Pool closed at {}", self.now);
        Ok(())
    }

    /// Nothing left in any lender's withdrawal pipeline
    pub fn drained(&self) -> bool {
        self.lenders.iter().all(|l| {
            let s = self.pool.withdraw_state(self.now, &l.address);
            s.committed_shares() == 0
        })
    }

    fn submit_requests(&mut self) {
        let period = match self.pool.current_period(self.now) {
            Some(p) => p,
            None => return,
        };
        for lender in self.lenders.iter_mut() {
            if lender.requested || lender.config.request == 0 || lender.config.request_period != period {
                continue;
            }
            lender.requested = true;
            let shares = (lender.config.request as u128).min(self.pool.max_redeem_request(self.now, &lender.address));
            match self.pool.request_redeem(self.now, &lender.address, shares) {
                Ok(r) => log::info!("{} requested {} shares for period {}", lender.name, r.shares, r.eligible_period),
                Err(e) => log::warn!("{} request rejected: {}", lender.name, e),
            }
        }
    }

    fn service_loans(&mut self, period: u64) {
        for sim in self.loans.iter_mut().filter(|l| !l.settled) {
            let address = sim.loan.address();

            if sim.config.default_period == Some(period) {
                match self.pool.default_loan(self.now, &self.admin, &address) {
                    Ok(r) => log::warn!(
                        "{} defaulted: {} written off, {} uncovered",
                        sim.name,
                        r.written_off,
                        r.uncovered
                    ),
                    Err(e) => log::warn!("{} default rejected: {}", sim.name, e),
                }
                sim.settled = true;
                continue;
            }

            while sim.loan.payments_remaining() > 0 && sim.loan.payment_due_date() <= self.now {
                let last = sim.loan.payments_remaining() == 1;
                let principal = if last { sim.loan.principal() } else { 0 };
                match self.pool.receive_loan_payment(self.now, &address, sim.loan.payment_amount(), principal) {
                    Ok(receipt) => {
                        sim.loan.record_payment();
                        if receipt.retired {
                            log::info!("{} repaid in full", sim.name);
                            sim.settled = true;
                        }
                    }
                    Err(e) => {
                        log::warn!("{} payment rejected: {}", sim.name, e);
                        break;
                    }
                }
            }
        }
    }

    fn refresh_backlog(&mut self) {
        for lender in &self.lenders {
            self.queue.push(Backlog {
                lender: lender.address,
                unclaimed: self.pool.unclaimed_snapshots(self.now, &lender.address),
                last_update: self.now,
            });
        }
    }

    fn work_backlog(&mut self) -> Result<usize> {
        let mut claims = 0;
        while claims < self.claims_per_tick {
            let backlog = match self.queue.pop() {
                Some(b) => b,
                None => break,
            };
            let outcome = self
                .pool
                .claim_snapshots(self.now, &backlog.lender, self.claim_batch)
                .context(format!("Claim for {} failed", backlog.lender))?;
            log::debug!(
                "Claimed {} snapshots for {} (more pending: {})",
                outcome.applied,
                backlog.lender,
                outcome.claim_required
            );
            claims += 1;
        }
        Ok(claims)
    }

    fn redeem_ready(&mut self) -> u128 {
        let mut total = 0u128;
        for lender in self.lenders.iter_mut() {
            let who = lender.address;
            if self.pool.claim_required(self.now, &who) {
                continue;
            }
            let shares = self.pool.max_redeem(self.now, &who);
            if shares == 0 {
                continue;
            }
            match self.pool.redeem(self.now, &who, shares, &who, &who) {
                Ok(assets) => {
                    lender.redeemed = lender.redeemed.saturating_add(assets);
                    total = total.saturating_add(assets);
                    log::info!("{} redeemed {} shares for {}", lender.name, shares, assets);
                }
                Err(PoolError::InsufficientLiquidity) => {
                    log::warn!("{} redeem blocked on liquidity", lender.name)
                }
                Err(e) => log::warn!("{} redeem rejected: {}", lender.name, e),
            }
        }
        total
    }

    pub fn report(&self) -> Report {
        Report {
            ticks: self.ticks,
            closed_at: self.closed_at,
            snapshots: self.pool.snapshots().len(),
            total_assets: self.pool.total_assets(self.now),
            service_fees: self.pool.service_fees(),
            first_loss_balance: self.pool.first_loss_balance(),
            pool_token_balance: self.token.balance_of(&self.pool.address()),
            lenders: self
                .lenders
                .iter()
                .map(|l| LenderReport {
                    name: l.name.clone(),
                    address: l.address.to_string(),
                    deposited: l.deposited,
                    redeemed: l.redeemed,
                    shares_left: self.pool.balance_of(&l.address),
                })
                .collect(),
        }
    }
}

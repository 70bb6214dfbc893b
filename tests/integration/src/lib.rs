//! Tranche Pool Integration Tests
//!
//! Drives a full [`Pool`] through the in-memory token, escrow and loan
//! collaborators. Every scenario starts from an activated pool at [`START`].

use pool_model::{Snapshot, SECONDS_PER_DAY};
use tranche_common::memory::{MemoryEscrow, MemoryLoan, MemoryToken};
use tranche_common::{AccessPredicate, Address, AllowAll, LoanInstrument, PoolSettings, Timestamp};
use tranche_pool::{Collaborators, Pool};

pub use tranche_common::memory::AllowList;

pub const START: Timestamp = 1_700_000_000;
pub const PERIOD: u64 = 30 * SECONDS_PER_DAY;
pub const FIRST_LOSS: u128 = 100_000;

/// Fee-free settings with the given gate, ten years to run
pub fn settings(gate_bps: u128) -> PoolSettings {
    PoolSettings {
        max_capacity: 100_000_000,
        end_date: START + 3_650 * SECONDS_PER_DAY,
        request_fee_bps: 0,
        request_cancellation_fee_bps: 0,
        withdraw_gate_bps: gate_bps,
        withdraw_request_period_duration: PERIOD,
        first_loss_initial_minimum: FIRST_LOSS,
        ..PoolSettings::default()
    }
}

pub struct Harness {
    pub pool: Pool,
    pub token: MemoryToken,
    pub escrow: MemoryEscrow,
    pub admin: Address,
    pub now: Timestamp,
}

impl Harness {
    /// Pool created but not yet activated
    pub fn new(settings: PoolSettings) -> Self {
        Self::with_access(settings, Box::new(AllowAll))
    }

    pub fn with_access(settings: PoolSettings, access: Box<dyn AccessPredicate>) -> Self {
        let token = MemoryToken::new();
        let escrow = MemoryEscrow::new(&token);
        let admin = Address::new_unique();
        let collaborators = Collaborators {
            token: Box::new(token.clone()),
            access,
            first_loss: Box::new(escrow.clone()),
        };
        let pool = Pool::new(Address::new_unique(), admin, settings, collaborators)
            .expect("valid settings");
        Self {
            pool,
            token,
            escrow,
            admin,
            now: START,
        }
    }

    /// Pool activated at [`START`] with the minimum first loss
    pub fn activated(settings: PoolSettings) -> Self {
        let mut h = Self::new(settings);
        h.fund_first_loss(FIRST_LOSS);
        h
    }

    pub fn fund_first_loss(&mut self, amount: u128) -> bool {
        self.token.mint(&self.admin, amount);
        self.pool
            .deposit_first_loss(self.now, &self.admin, amount)
            .expect("first loss deposit")
    }

    /// New lender holding the shares for `assets`
    pub fn lender(&mut self, assets: u128) -> Address {
        let who = Address::new_unique();
        self.deposit(&who, assets);
        who
    }

    pub fn deposit(&mut self, who: &Address, assets: u128) -> u128 {
        self.token.mint(who, assets);
        self.pool
            .deposit(self.now, who, assets, who)
            .expect("deposit")
    }

    pub fn request(&mut self, who: &Address, shares: u128) {
        self.pool
            .request_redeem(self.now, who, shares)
            .expect("request");
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }

    /// Move one withdraw period forward and crank
    pub fn next_period(&mut self) -> Option<Snapshot> {
        self.advance(PERIOD);
        self.pool.crank(self.now).expect("crank")
    }

    /// End the pool now
    pub fn close(&mut self) {
        self.pool
            .set_pool_end_date(self.now, &self.admin, self.now)
            .expect("close");
    }

    /// Redeem everything `who` has admitted; returns assets paid
    pub fn redeem_all(&mut self, who: &Address) -> u128 {
        let shares = self.pool.max_redeem(self.now, who);
        if shares == 0 {
            return 0;
        }
        self.pool
            .redeem(self.now, who, shares, who, who)
            .expect("redeem")
    }

    /// Fund and activate a loan; the borrower holds its full interest budget
    pub fn loan(&mut self, principal: u128, payment: u128, payments: u64) -> MemoryLoan {
        let loan = MemoryLoan::new(principal, payment, payments, PERIOD);
        self.pool
            .fund_loan(self.now, &self.admin, loan.instrument())
            .expect("fund loan");
        loan.activate(self.now);
        self.token.mint(&loan.address(), payment * payments as u128);
        loan
    }
}

//! In-memory collaborators
//!
//! Single-threaded doubles for the collaborator traits, shared through
//! `Rc<RefCell<_>>` so a driver can keep a handle to state the pool also
//! holds (token balances, loan terms).

use crate::collaborators::{AccessPredicate, FirstLossBuffer, LoanInstrument, TokenTransfer};
use crate::error::TransferError;
use crate::types::{Address, Timestamp};
use pool_model::LoanState;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

#[derive(Debug, Default)]
struct TokenBalances {
    accounts: BTreeMap<Address, u128>,
    paused: bool,
}

/// Liquidity asset ledger
#[derive(Debug, Clone, Default)]
pub struct MemoryToken(Rc<RefCell<TokenBalances>>);

impl MemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self, to: &Address, amount: u128) {
        let mut b = self.0.borrow_mut();
        let entry = b.accounts.entry(*to).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub fn balance_of(&self, who: &Address) -> u128 {
        self.0.borrow().accounts.get(who).copied().unwrap_or(0)
    }

    /// A paused token rejects every transfer
    pub fn set_paused(&self, paused: bool) {
        self.0.borrow_mut().paused = paused;
    }

    fn move_funds(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError> {
        let mut b = self.0.borrow_mut();
        if b.paused {
            return Err(TransferError::new("token paused"));
        }
        let have = b.accounts.get(from).copied().unwrap_or(0);
        if have < amount {
            return Err(TransferError::new(format!(
                "insufficient funds: {} has {}, needs {}",
                from, have, amount
            )));
        }
        b.accounts.insert(*from, have - amount);
        let entry = b.accounts.entry(*to).or_insert(0);
        *entry = entry.saturating_add(amount);
        Ok(())
    }
}

impl TokenTransfer for MemoryToken {
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError> {
        self.move_funds(from, to, amount)
    }
}

/// First-loss escrow holding its balance in a [`MemoryToken`] account
#[derive(Debug, Clone)]
pub struct MemoryEscrow {
    address: Address,
    token: MemoryToken,
}

impl MemoryEscrow {
    pub fn new(token: &MemoryToken) -> Self {
        Self {
            address: Address::new_unique(),
            token: token.clone(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl FirstLossBuffer for MemoryEscrow {
    fn balance(&self) -> u128 {
        self.token.balance_of(&self.address)
    }

    fn deposit(&mut self, from: &Address, amount: u128) -> Result<(), TransferError> {
        self.token.move_funds(from, &self.address, amount)
    }

    fn withdraw(&mut self, receiver: &Address, amount: u128) -> Result<(), TransferError> {
        self.token.move_funds(&self.address, receiver, amount)
    }
}

#[derive(Debug, Clone)]
struct LoanData {
    address: Address,
    principal: u128,
    payment: u128,
    payments_remaining: u64,
    payment_due_date: Timestamp,
    payment_period: u64,
    state: LoanState,
}

/// Loan whose lifecycle the driver advances by hand
#[derive(Debug, Clone)]
pub struct MemoryLoan(Rc<RefCell<LoanData>>);

impl MemoryLoan {
    /// A loan in state Requested
    pub fn new(principal: u128, payment: u128, payments: u64, payment_period: u64) -> Self {
        Self(Rc::new(RefCell::new(LoanData {
            address: Address::new_unique(),
            principal,
            payment,
            payments_remaining: payments,
            payment_due_date: 0,
            payment_period,
            state: LoanState::Requested,
        })))
    }

    pub fn set_state(&self, state: LoanState) {
        self.0.borrow_mut().state = state;
    }

    /// Borrower drew the funds; the first payment is due one period later
    pub fn activate(&self, now: Timestamp) {
        let mut d = self.0.borrow_mut();
        d.state = LoanState::Active;
        d.payment_due_date = now.saturating_add(d.payment_period);
    }

    /// One scheduled payment made; matures after the last one
    pub fn record_payment(&self) {
        let mut d = self.0.borrow_mut();
        d.payments_remaining = d.payments_remaining.saturating_sub(1);
        d.payment_due_date = d.payment_due_date.saturating_add(d.payment_period);
        if d.payments_remaining == 0 {
            d.state = LoanState::Matured;
        }
    }

    /// Boxed handle sharing this loan's state, for handing to the pool
    pub fn instrument(&self) -> Box<dyn LoanInstrument> {
        Box::new(self.clone())
    }
}

impl LoanInstrument for MemoryLoan {
    fn address(&self) -> Address {
        self.0.borrow().address
    }

    fn principal(&self) -> u128 {
        self.0.borrow().principal
    }

    fn payment_amount(&self) -> u128 {
        self.0.borrow().payment
    }

    fn payments_remaining(&self) -> u64 {
        self.0.borrow().payments_remaining
    }

    fn payment_due_date(&self) -> Timestamp {
        self.0.borrow().payment_due_date
    }

    fn payment_period(&self) -> u64 {
        self.0.borrow().payment_period
    }

    fn state(&self) -> LoanState {
        self.0.borrow().state
    }
}

/// Allow-list predicate
#[derive(Debug, Clone, Default)]
pub struct AllowList(BTreeSet<Address>);

impl AllowList {
    pub fn new<I: IntoIterator<Item = Address>>(allowed: I) -> Self {
        Self(allowed.into_iter().collect())
    }
}

impl AccessPredicate for AllowList {
    fn is_allowed(&self, participant: &Address) -> bool {
        self.0.contains(participant)
    }
}

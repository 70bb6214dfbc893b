//! Contracts the pool requires from its external collaborators
//!
//! The pool never reaches into token balances, loan internals or escrow
//! custody directly; it only calls through these traits. A failing call
//! fails the whole enclosing operation.

use crate::error::TransferError;
use crate::types::{Address, Timestamp};
use pool_model::{LoanState, LoanTerms};

/// Moves the liquidity asset between addresses
pub trait TokenTransfer {
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError>;
}

/// Opaque allow-list decision consulted before deposits and requests
pub trait AccessPredicate {
    fn is_allowed(&self, participant: &Address) -> bool;
}

/// Permissionless pools allow everyone
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPredicate for AllowAll {
    fn is_allowed(&self, _participant: &Address) -> bool {
        true
    }
}

/// Read-only view of a loan instrument
pub trait LoanInstrument {
    fn address(&self) -> Address;
    fn principal(&self) -> u128;
    fn payment_amount(&self) -> u128;
    fn payments_remaining(&self) -> u64;
    fn payment_due_date(&self) -> Timestamp;
    /// Length of one payment period in seconds
    fn payment_period(&self) -> u64;
    fn state(&self) -> LoanState;

    fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal(),
            payment: self.payment_amount(),
            payments_remaining: self.payments_remaining(),
            payment_due_date: self.payment_due_date(),
            payment_period: self.payment_period(),
            state: self.state(),
        }
    }
}

/// First-loss escrow
pub trait FirstLossBuffer {
    fn balance(&self) -> u128;
    /// Pull `amount` from `from` into the escrow
    fn deposit(&mut self, from: &Address, amount: u128) -> Result<(), TransferError>;
    /// Release `amount` from the escrow to `receiver`
    fn withdraw(&mut self, receiver: &Address, amount: u128) -> Result<(), TransferError>;
}

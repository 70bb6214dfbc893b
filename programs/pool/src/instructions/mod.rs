//! Pool instruction handlers
//!
//! Each handler validates, mutates the ledger it is given, and returns at
//! most one external [`Effect`] for the caller to execute afterwards. The
//! handlers never call collaborators themselves.

pub mod deposit;
pub mod request;
pub mod cancel;
pub mod crank;
pub mod redeem;
pub mod fund_loan;
pub mod loan_payment;
pub mod default_loan;
pub mod first_loss;
pub mod fees;
pub mod settings;

pub use deposit::*;
pub use request::*;
pub use cancel::*;
pub use crank::*;
pub use redeem::*;
pub use fund_loan::*;
pub use loan_payment::*;
pub use default_loan::*;
pub use first_loss::*;
pub use fees::*;
pub use settings::*;

use tranche_common::Address;

/// External side effect of an instruction, executed after the ledger update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Move the liquidity asset
    Transfer { from: Address, to: Address, amount: u128 },
    /// Pull capital into the first-loss escrow
    FirstLossDeposit { from: Address, amount: u128 },
    /// Release capital from the first-loss escrow
    FirstLossWithdraw { to: Address, amount: u128 },
}

//! First-loss accounting
//!
//! The escrow itself is an external collaborator; this tracks what the pool
//! has pushed into it and pulled out of it:
//! - Deposits by the pool admin (activating the pool once the minimum is met)
//! - Capital applied to cover defaulted principal
//! - Withdrawals once the pool has wound down

use pool_model::math::{add_u128, min_u128, sub_u128};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstLossState {
    /// Total deposited into the escrow since inception
    pub total_deposited: u128,
    /// Total applied to defaults
    pub total_applied: u128,
    /// Total withdrawn by the admin
    pub total_withdrawn: u128,
    /// Defaulted principal the buffer could not cover
    pub uncovered_losses: u128,
}

impl FirstLossState {
    pub fn record_deposit(&mut self, amount: u128) {
        self.total_deposited = add_u128(self.total_deposited, amount);
    }

    /// Cover a defaulted principal from the buffer
    ///
    /// # Arguments
    /// * `outstanding` - Principal being written off
    /// * `buffer_balance` - Current escrow balance
    ///
    /// # Returns
    /// `(applied, uncovered)` where `applied` moves from the escrow into the
    /// pool and `uncovered` is the loss left for the share price to absorb
    pub fn settle_default(&mut self, outstanding: u128, buffer_balance: u128) -> (u128, u128) {
        let applied = min_u128(outstanding, buffer_balance);
        let uncovered = sub_u128(outstanding, applied);

        self.total_applied = add_u128(self.total_applied, applied);
        if uncovered > 0 {
            self.uncovered_losses = add_u128(self.uncovered_losses, uncovered);
        }

        (applied, uncovered)
    }

    pub fn record_withdrawal(&mut self, amount: u128) {
        self.total_withdrawn = add_u128(self.total_withdrawn, amount);
    }
}

//! Pool share ledger (non-transferable)

use pool_model::math::{add_u128, sub_u128};
use std::collections::BTreeMap;
use tranche_common::{Address, PoolError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareLedger {
    pub total_supply: u128,
    balances: BTreeMap<Address, u128>,
}

impl ShareLedger {
    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn mint(&mut self, to: &Address, shares: u128) {
        let entry = self.balances.entry(*to).or_insert(0);
        *entry = add_u128(*entry, shares);
        self.total_supply = add_u128(self.total_supply, shares);
    }

    pub fn burn(&mut self, from: &Address, shares: u128) -> Result<(), PoolError> {
        let balance = self.balance_of(from);
        if balance < shares {
            return Err(PoolError::InsufficientBalance);
        }
        if balance == shares {
            self.balances.remove(from);
        } else {
            self.balances.insert(*from, balance - shares);
        }
        self.total_supply = sub_u128(self.total_supply, shares);
        Ok(())
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.balances.iter()
    }
}

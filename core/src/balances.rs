//! Spendable balances and circulating supply

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::address::Address;
use crate::error::{LedgerError, Result};
use crate::Amount;

/// Per-account spendable balances.
///
/// `total_supply` always equals the sum of `balances`. Locked stake and
/// pending rewards are not part of the supply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLedger {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl BalanceLedger {
    /// Ledger with `initial_supply` credited to `holder`.
    pub fn with_genesis(holder: Address, initial_supply: Amount) -> Self {
        let mut balances = HashMap::new();
        balances.insert(holder, initial_supply);
        Self {
            balances,
            total_supply: initial_supply,
        }
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// Move `amount` from `from` to `to`. A zero amount is a valid no-op.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }

        // Recipient balance is bounded by supply, so this cannot overflow.
        self.balances.insert(*from, available - amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    /// Credit `to` and grow the supply. Internal to the ledger.
    pub(crate) fn mint(&mut self, to: &Address, amount: Amount) -> Result<()> {
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("total supply"))?;

        *self.balances.entry(*to).or_insert(0) += amount;
        self.total_supply = new_supply;
        Ok(())
    }

    /// Debit `from` and shrink the supply. Internal to the ledger.
    pub(crate) fn burn(&mut self, from: &Address, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        self.balances.insert(*from, available - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Sum of all balances, `None` on overflow.
    pub(crate) fn sum_balances(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(0 as Amount, |acc, v| acc.checked_add(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xb0)
    }

    #[test]
    fn test_genesis() {
        let ledger = BalanceLedger::with_genesis(alice(), 1000);
        assert_eq!(ledger.balance_of(&alice()), 1000);
        assert_eq!(ledger.balance_of(&bob()), 0);
        assert_eq!(ledger.total_supply(), 1000);
    }

    #[test]
    fn test_transfer() {
        let mut ledger = BalanceLedger::with_genesis(alice(), 1000);

        ledger.transfer(&alice(), &bob(), 300).unwrap();
        assert_eq!(ledger.balance_of(&alice()), 700);
        assert_eq!(ledger.balance_of(&bob()), 300);
        assert_eq!(ledger.total_supply(), 1000);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = BalanceLedger::with_genesis(alice(), 10);

        let err = ledger.transfer(&bob(), &alice(), 1).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                requested: 1,
                available: 0
            }
        );
        assert_eq!(ledger.balance_of(&alice()), 10);
    }

    #[test]
    fn test_zero_and_self_transfer_are_noops() {
        let mut ledger = BalanceLedger::with_genesis(alice(), 10);
        let before = ledger.clone();

        ledger.transfer(&bob(), &alice(), 0).unwrap();
        ledger.transfer(&alice(), &alice(), 10).unwrap();
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_mint_and_burn_track_supply() {
        let mut ledger = BalanceLedger::with_genesis(alice(), 100);

        ledger.mint(&bob(), 5).unwrap();
        assert_eq!(ledger.balance_of(&bob()), 5);
        assert_eq!(ledger.total_supply(), 105);

        ledger.burn(&alice(), 40).unwrap();
        assert_eq!(ledger.balance_of(&alice()), 60);
        assert_eq!(ledger.total_supply(), 65);

        assert!(ledger.burn(&bob(), 6).is_err());
        assert_eq!(ledger.sum_balances(), Some(ledger.total_supply()));
    }

    #[test]
    fn test_mint_overflow_rejected() {
        let mut ledger = BalanceLedger::with_genesis(alice(), Amount::MAX);

        assert_eq!(
            ledger.mint(&bob(), 1),
            Err(LedgerError::Overflow("total supply"))
        );
        assert_eq!(ledger.balance_of(&bob()), 0);
    }
}

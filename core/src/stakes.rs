//! Locked stakes and the stakeholder set

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::address::Address;
use crate::balances::BalanceLedger;
use crate::error::{InvariantViolation, LedgerError, Result};
use crate::Amount;

/// Index reported by [`StakeholderSet::position`] for non-members.
pub const NOT_A_STAKEHOLDER_INDEX: usize = 0;

/// Ordered set of accounts with positive stake.
///
/// Dense vector plus a position map: O(1) membership, insert and remove.
/// Removal swaps the last member into the freed slot, so positions of other
/// members change on every removal and must not be held across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct StakeholderSet {
    members: Vec<Address>,
    positions: HashMap<Address, usize>,
}

impl StakeholderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.positions.contains_key(account)
    }

    /// `(true, index)` for members, `(false, NOT_A_STAKEHOLDER_INDEX)` otherwise.
    pub fn position(&self, account: &Address) -> (bool, usize) {
        match self.positions.get(account) {
            Some(&index) => (true, index),
            None => (false, NOT_A_STAKEHOLDER_INDEX),
        }
    }

    /// Returns false if already present.
    pub fn insert(&mut self, account: Address) -> bool {
        if self.positions.contains_key(&account) {
            return false;
        }
        self.positions.insert(account, self.members.len());
        self.members.push(account);
        true
    }

    /// Returns false if not present.
    pub fn remove(&mut self, account: &Address) -> bool {
        let Some(index) = self.positions.remove(account) else {
            return false;
        };
        self.members.swap_remove(index);
        if let Some(moved) = self.members.get(index) {
            self.positions.insert(*moved, index);
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.members
    }
}

/// Rebuilds the position index from a persisted member list. A repeated
/// account is corrupt state and is refused rather than collapsed.
impl TryFrom<Vec<Address>> for StakeholderSet {
    type Error = InvariantViolation;

    fn try_from(accounts: Vec<Address>) -> std::result::Result<Self, Self::Error> {
        let mut set = StakeholderSet::new();
        for account in accounts {
            if !set.insert(account) {
                return Err(InvariantViolation::DuplicateStakeholder(account));
            }
        }
        Ok(set)
    }
}

impl From<StakeholderSet> for Vec<Address> {
    fn from(set: StakeholderSet) -> Self {
        set.members
    }
}

/// Stake accounting: per-account locked amounts, their total and the
/// stakeholder set. Staking burns balance; unstaking mints it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeManager {
    stakes: HashMap<Address, Amount>,
    total_stakes: Amount,
    stakeholders: StakeholderSet,
}

impl StakeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stake_of(&self, account: &Address) -> Amount {
        self.stakes.get(account).copied().unwrap_or(0)
    }

    pub fn total_stakes(&self) -> Amount {
        self.total_stakes
    }

    pub fn is_stakeholder(&self, account: &Address) -> (bool, usize) {
        self.stakeholders.position(account)
    }

    pub fn stakeholders(&self) -> &StakeholderSet {
        &self.stakeholders
    }

    /// Lock `amount` of `caller`'s balance. Returns true if `caller` became
    /// a stakeholder.
    pub fn create_stake(
        &mut self,
        balances: &mut BalanceLedger,
        caller: &Address,
        amount: Amount,
    ) -> Result<bool> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "stake amount must be positive".to_string(),
            ));
        }
        let available = balances.balance_of(caller);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        let current = self.stake_of(caller);
        let new_stake = current
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("stake"))?;
        let new_total = self
            .total_stakes
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("total stakes"))?;

        balances.burn(caller, amount)?;
        self.stakes.insert(*caller, new_stake);
        self.total_stakes = new_total;

        Ok(current == 0 && self.stakeholders.insert(*caller))
    }

    /// Unlock `amount` of `caller`'s stake back into balance. Returns true if
    /// `caller` stopped being a stakeholder.
    pub fn remove_stake(
        &mut self,
        balances: &mut BalanceLedger,
        caller: &Address,
        amount: Amount,
    ) -> Result<bool> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "unstake amount must be positive".to_string(),
            ));
        }
        let current = self.stake_of(caller);
        if amount > current {
            return Err(LedgerError::InsufficientStake {
                requested: amount,
                available: current,
            });
        }
        balances.mint(caller, amount)?;

        let remaining = current - amount;
        self.total_stakes -= amount;

        if remaining == 0 {
            self.stakes.remove(caller);
            Ok(self.stakeholders.remove(caller))
        } else {
            self.stakes.insert(*caller, remaining);
            Ok(false)
        }
    }

    pub(crate) fn stakes(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.stakes.iter()
    }

    pub(crate) fn sum_stakes(&self) -> Option<Amount> {
        self.stakes
            .values()
            .try_fold(0 as Amount, |acc, v| acc.checked_add(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_set_insert_and_position() {
        let mut set = StakeholderSet::new();
        assert!(set.insert(addr(1)));
        assert!(set.insert(addr(2)));
        assert!(!set.insert(addr(1)));

        assert_eq!(set.len(), 2);
        assert_eq!(set.position(&addr(1)), (true, 0));
        assert_eq!(set.position(&addr(2)), (true, 1));
        assert_eq!(set.position(&addr(3)), (false, NOT_A_STAKEHOLDER_INDEX));
    }

    #[test]
    fn test_set_remove_swaps_last_into_slot() {
        let mut set = StakeholderSet::new();
        for b in 1..=4 {
            set.insert(addr(b));
        }

        assert!(set.remove(&addr(2)));
        assert!(!set.remove(&addr(2)));

        // addr(4) moved into the freed slot; index previously observed is stale.
        assert_eq!(set.as_slice(), &[addr(1), addr(4), addr(3)]);
        assert_eq!(set.position(&addr(4)), (true, 1));
        assert_eq!(set.position(&addr(3)), (true, 2));

        assert!(set.remove(&addr(3)));
        assert_eq!(set.as_slice(), &[addr(1), addr(4)]);
        assert_eq!(set.position(&addr(1)), (true, 0));
    }

    #[test]
    fn test_set_serde_rebuilds_positions() {
        let mut set = StakeholderSet::new();
        set.insert(addr(7));
        set.insert(addr(9));

        let json = serde_json::to_string(&set).unwrap();
        let back: StakeholderSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert_eq!(back.position(&addr(9)), (true, 1));
    }

    #[test]
    fn test_set_rejects_duplicate_members() {
        assert_eq!(
            StakeholderSet::try_from(vec![addr(1), addr(2), addr(1)]),
            Err(InvariantViolation::DuplicateStakeholder(addr(1)))
        );

        let json = serde_json::to_string(&vec![addr(5), addr(5)]).unwrap();
        assert!(serde_json::from_str::<StakeholderSet>(&json).is_err());
    }

    #[test]
    fn test_create_stake_burns_balance() {
        let mut balances = BalanceLedger::with_genesis(addr(1), 10);
        let mut stakes = StakeManager::new();

        assert!(stakes.create_stake(&mut balances, &addr(1), 4).unwrap());
        assert!(!stakes.create_stake(&mut balances, &addr(1), 1).unwrap());

        assert_eq!(stakes.stake_of(&addr(1)), 5);
        assert_eq!(stakes.total_stakes(), 5);
        assert_eq!(balances.balance_of(&addr(1)), 5);
        assert_eq!(balances.total_supply(), 5);
        assert_eq!(stakes.stakeholders().len(), 1);
    }

    #[test]
    fn test_create_stake_rejects_zero_and_excess() {
        let mut balances = BalanceLedger::with_genesis(addr(1), 10);
        let mut stakes = StakeManager::new();

        assert!(matches!(
            stakes.create_stake(&mut balances, &addr(1), 0),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert_eq!(
            stakes.create_stake(&mut balances, &addr(1), 11),
            Err(LedgerError::InsufficientBalance {
                requested: 11,
                available: 10
            })
        );
        assert_eq!(stakes, StakeManager::new());
        assert_eq!(balances.balance_of(&addr(1)), 10);
    }

    #[test]
    fn test_remove_stake_mints_back() {
        let mut balances = BalanceLedger::with_genesis(addr(1), 10);
        let mut stakes = StakeManager::new();
        stakes.create_stake(&mut balances, &addr(1), 6).unwrap();

        assert!(!stakes.remove_stake(&mut balances, &addr(1), 2).unwrap());
        assert_eq!(stakes.stake_of(&addr(1)), 4);
        assert_eq!(balances.balance_of(&addr(1)), 6);

        assert!(stakes.remove_stake(&mut balances, &addr(1), 4).unwrap());
        assert_eq!(stakes.stake_of(&addr(1)), 0);
        assert_eq!(stakes.is_stakeholder(&addr(1)).0, false);
        assert_eq!(balances.total_supply(), 10);
    }

    #[test]
    fn test_remove_stake_rejects_zero_and_excess() {
        let mut balances = BalanceLedger::with_genesis(addr(1), 10);
        let mut stakes = StakeManager::new();
        stakes.create_stake(&mut balances, &addr(1), 3).unwrap();

        assert!(matches!(
            stakes.remove_stake(&mut balances, &addr(1), 0),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert_eq!(
            stakes.remove_stake(&mut balances, &addr(1), 4),
            Err(LedgerError::InsufficientStake {
                requested: 4,
                available: 3
            })
        );
        assert_eq!(stakes.stake_of(&addr(1)), 3);
    }
}

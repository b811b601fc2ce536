//! Reward computation, distribution and withdrawal

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::address::Address;
use crate::balances::BalanceLedger;
use crate::constants::REWARD_RATE;
use crate::error::{LedgerError, Result};
use crate::stakes::StakeManager;
use crate::Amount;

/// Reward owed for one distribution round on `stake`. Floors, so stakes
/// below `REWARD_RATE` earn nothing.
pub fn calculate_reward(stake: Amount) -> Amount {
    stake / REWARD_RATE
}

/// Pending (unwithdrawn) rewards per account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDistributor {
    rewards: HashMap<Address, Amount>,
    total_rewards: Amount,
}

impl RewardDistributor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reward_of(&self, account: &Address) -> Amount {
        self.rewards.get(account).copied().unwrap_or(0)
    }

    pub fn total_rewards(&self) -> Amount {
        self.total_rewards
    }

    /// Credit one round of rewards to every stakeholder, in stakeholder-set
    /// order. All increments are computed and checked before any is applied.
    ///
    /// Returns the non-zero credits that were applied.
    pub fn distribute(&mut self, stakes: &StakeManager) -> Result<Vec<(Address, Amount)>> {
        if stakes.stakeholders().is_empty() {
            return Ok(Vec::new());
        }

        let mut credits = Vec::with_capacity(stakes.stakeholders().len());
        let mut new_total = self.total_rewards;

        for account in stakes.stakeholders().iter() {
            let increment = calculate_reward(stakes.stake_of(account));
            if increment == 0 {
                continue;
            }
            self.reward_of(account)
                .checked_add(increment)
                .ok_or(LedgerError::Overflow("reward"))?;
            new_total = new_total
                .checked_add(increment)
                .ok_or(LedgerError::Overflow("total rewards"))?;
            credits.push((*account, increment));
        }

        for (account, increment) in &credits {
            *self.rewards.entry(*account).or_insert(0) += increment;
        }
        self.total_rewards = new_total;

        Ok(credits)
    }

    /// Mint `caller`'s pending reward into their balance. Nothing pending is
    /// a successful no-op returning 0.
    pub fn withdraw(&mut self, balances: &mut BalanceLedger, caller: &Address) -> Result<Amount> {
        let pending = self.reward_of(caller);
        if pending == 0 {
            return Ok(0);
        }

        balances.mint(caller, pending)?;
        self.rewards.remove(caller);
        self.total_rewards -= pending;
        Ok(pending)
    }

    pub(crate) fn sum_rewards(&self) -> Option<Amount> {
        self.rewards
            .values()
            .try_fold(0 as Amount, |acc, v| acc.checked_add(*v))
    }
}

//! The staking ledger: balances, stakes, rewards and owner in one aggregate.
//!
//! Every mutating operation validates its preconditions before touching
//! state, so a failed operation leaves the ledger exactly as it was.

use serde::{Deserialize, Serialize};

use crate::access::AccessController;
use crate::address::Address;
use crate::balances::BalanceLedger;
use crate::error::{InvariantViolation, Result};
use crate::events::LedgerEvent;
use crate::rewards::{self, RewardDistributor};
use crate::stakes::StakeManager;
use crate::Amount;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingLedger {
    access: AccessController,
    balances: BalanceLedger,
    stakes: StakeManager,
    rewards: RewardDistributor,
    /// Open only while `apply` runs; direct method calls record nothing.
    #[serde(skip)]
    events: Option<Vec<LedgerEvent>>,
}

impl PartialEq for StakingLedger {
    fn eq(&self, other: &Self) -> bool {
        self.access == other.access
            && self.balances == other.balances
            && self.stakes == other.stakes
            && self.rewards == other.rewards
    }
}

impl Eq for StakingLedger {}

impl StakingLedger {
    /// Genesis: `initial_supply` credited to `owner`, no stakes or rewards.
    pub fn new(owner: Address, initial_supply: Amount) -> Self {
        log::debug!("genesis: owner {} supply {}", owner, initial_supply);
        Self {
            access: AccessController::new(owner),
            balances: BalanceLedger::with_genesis(owner, initial_supply),
            stakes: StakeManager::new(),
            rewards: RewardDistributor::new(),
            events: None,
        }
    }

    // ----- reads -----

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.balances.total_supply()
    }

    pub fn stake_of(&self, account: &Address) -> Amount {
        self.stakes.stake_of(account)
    }

    pub fn total_stakes(&self) -> Amount {
        self.stakes.total_stakes()
    }

    /// `(present, index)`. The index is only valid until the next mutating
    /// call; non-members report `NOT_A_STAKEHOLDER_INDEX`.
    pub fn is_stakeholder(&self, account: &Address) -> (bool, usize) {
        self.stakes.is_stakeholder(account)
    }

    pub fn stakeholders(&self) -> &[Address] {
        self.stakes.stakeholders().as_slice()
    }

    pub fn reward_of(&self, account: &Address) -> Amount {
        self.rewards.reward_of(account)
    }

    pub fn total_rewards(&self) -> Amount {
        self.rewards.total_rewards()
    }

    /// What the next distribution would credit to `account`.
    pub fn calculate_reward(&self, account: &Address) -> Amount {
        rewards::calculate_reward(self.stakes.stake_of(account))
    }

    /// Every account with a balance entry, sorted by address.
    pub fn accounts(&self) -> Vec<(Address, Amount)> {
        let mut accounts: Vec<_> = self
            .balances
            .accounts()
            .map(|(account, amount)| (*account, *amount))
            .collect();
        accounts.sort();
        accounts
    }

    // ----- transitions -----

    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        self.balances.transfer(caller, to, amount)?;
        log::debug!("transfer {} from {} to {}", amount, caller, to);

        if amount > 0 && caller != to {
            self.record(LedgerEvent::Transfer {
                from: *caller,
                to: *to,
                amount,
            });
        }
        self.debug_check();
        Ok(())
    }

    pub fn create_stake(&mut self, caller: &Address, amount: Amount) -> Result<()> {
        let joined = self
            .stakes
            .create_stake(&mut self.balances, caller, amount)?;
        log::debug!(
            "stake {} by {} (now {})",
            amount,
            caller,
            self.stakes.stake_of(caller)
        );

        self.record(LedgerEvent::Burned {
            from: *caller,
            amount,
        });
        if joined {
            self.record(LedgerEvent::StakeholderAdded { account: *caller });
        }
        self.debug_check();
        Ok(())
    }

    pub fn remove_stake(&mut self, caller: &Address, amount: Amount) -> Result<()> {
        let left = self
            .stakes
            .remove_stake(&mut self.balances, caller, amount)?;
        log::debug!(
            "unstake {} by {} (now {})",
            amount,
            caller,
            self.stakes.stake_of(caller)
        );

        self.record(LedgerEvent::Minted { to: *caller, amount });
        if left {
            self.record(LedgerEvent::StakeholderRemoved { account: *caller });
        }
        self.debug_check();
        Ok(())
    }

    /// Owner only. Credits one round of rewards to every stakeholder and
    /// returns the total credited.
    pub fn distribute_rewards(&mut self, caller: &Address) -> Result<Amount> {
        self.access.require_owner(caller)?;

        let credits = self.rewards.distribute(&self.stakes)?;
        let total: Amount = credits.iter().map(|(_, amount)| amount).sum();
        log::info!(
            "distributed {} reward across {} of {} stakeholders",
            total,
            credits.len(),
            self.stakes.stakeholders().len()
        );

        for (account, amount) in credits {
            self.record(LedgerEvent::RewardCredited { account, amount });
        }
        self.debug_check();
        Ok(total)
    }

    /// Moves the caller's pending reward into their balance. Returns the
    /// amount withdrawn; 0 when nothing was pending.
    pub fn withdraw_reward(&mut self, caller: &Address) -> Result<Amount> {
        let amount = self.rewards.withdraw(&mut self.balances, caller)?;
        if amount == 0 {
            log::debug!("withdraw by {}: nothing pending", caller);
            return Ok(0);
        }
        log::debug!("withdraw {} reward by {}", amount, caller);

        self.record(LedgerEvent::Minted { to: *caller, amount });
        self.record(LedgerEvent::RewardWithdrawn {
            account: *caller,
            amount,
        });
        self.debug_check();
        Ok(amount)
    }

    // ----- events and audit -----

    fn record(&mut self, event: LedgerEvent) {
        if let Some(events) = self.events.as_mut() {
            events.push(event);
        }
    }

    /// Runs `op` with event recording open and returns what it recorded.
    /// The buffer is closed again whatever the outcome, so nothing outlives
    /// the call.
    pub(crate) fn recording<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<(T, Vec<LedgerEvent>)> {
        self.events = Some(Vec::new());
        let result = op(self);
        let events = self.events.take().unwrap_or_default();
        result.map(|value| (value, events))
    }

    /// Verifies every accounting invariant of the ledger.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        let balances = self
            .balances
            .sum_balances()
            .ok_or(InvariantViolation::SumOverflow("balances"))?;
        if balances != self.balances.total_supply() {
            return Err(InvariantViolation::SupplyMismatch {
                recorded: self.balances.total_supply(),
                computed: balances,
            });
        }

        let stakes = self
            .stakes
            .sum_stakes()
            .ok_or(InvariantViolation::SumOverflow("stakes"))?;
        if stakes != self.stakes.total_stakes() {
            return Err(InvariantViolation::StakesMismatch {
                recorded: self.stakes.total_stakes(),
                computed: stakes,
            });
        }

        let rewards = self
            .rewards
            .sum_rewards()
            .ok_or(InvariantViolation::SumOverflow("rewards"))?;
        if rewards != self.rewards.total_rewards() {
            return Err(InvariantViolation::RewardsMismatch {
                recorded: self.rewards.total_rewards(),
                computed: rewards,
            });
        }

        let holders = self.stakes.stakeholders();
        for (account, stake) in self.stakes.stakes() {
            if (*stake > 0) != holders.contains(account) {
                return Err(InvariantViolation::StakeholderMismatch(*account));
            }
        }
        for (index, account) in holders.iter().enumerate() {
            if self.stakes.stake_of(account) == 0 || holders.position(account) != (true, index) {
                return Err(InvariantViolation::StakeholderMismatch(*account));
            }
        }

        Ok(())
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            if let Err(violation) = self.check_invariants() {
                panic!("ledger invariant violated: {}", violation);
            }
        }
    }
}

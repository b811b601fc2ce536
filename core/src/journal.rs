//! Operation journal and deterministic replay
//!
//! A journal is an ordered list of `(caller, operation)` entries. Replaying
//! the same journal against the same genesis ledger always yields the same
//! final state and the same per-entry outcomes.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::Result;
use crate::events::LedgerEvent;
use crate::ledger::StakingLedger;
use crate::Amount;

/// A mutating ledger operation, minus the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Transfer { to: Address, amount: Amount },
    CreateStake { amount: Amount },
    RemoveStake { amount: Amount },
    DistributeRewards,
    WithdrawReward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub caller: Address,
    pub operation: Operation,
}

impl JournalEntry {
    pub fn new(caller: Address, operation: Operation) -> Self {
        Self { caller, operation }
    }
}

/// Events produced by one successful operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub events: Vec<LedgerEvent>,
}

/// Result of replaying one journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub index: usize,
    pub entry: JournalEntry,
    pub result: Result<Receipt>,
}

impl EntryOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl StakingLedger {
    /// Dispatch one operation on behalf of an authenticated `caller`.
    pub fn apply(&mut self, caller: &Address, operation: &Operation) -> Result<Receipt> {
        let ((), events) = self.recording(|ledger| match operation {
            Operation::Transfer { to, amount } => ledger.transfer(caller, to, *amount),
            Operation::CreateStake { amount } => ledger.create_stake(caller, *amount),
            Operation::RemoveStake { amount } => ledger.remove_stake(caller, *amount),
            Operation::DistributeRewards => ledger.distribute_rewards(caller).map(drop),
            Operation::WithdrawReward => ledger.withdraw_reward(caller).map(drop),
        })?;
        Ok(Receipt { events })
    }
}

/// Apply `entries` in order. Rejected entries leave the ledger unchanged and
/// replay moves on to the next one.
pub fn replay(ledger: &mut StakingLedger, entries: &[JournalEntry]) -> Vec<EntryOutcome> {
    let mut outcomes = Vec::with_capacity(entries.len());
    let mut rejected = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        let result = ledger.apply(&entry.caller, &entry.operation);
        if let Err(e) = &result {
            rejected += 1;
            log::warn!(
                "journal entry {} rejected ({:?} by {}): {}",
                index,
                entry.operation,
                entry.caller,
                e
            );
        }
        outcomes.push(EntryOutcome {
            index,
            entry: entry.clone(),
            result,
        });
    }

    log::info!(
        "replayed {} journal entries ({} rejected)",
        entries.len(),
        rejected
    );
    outcomes
}

/// Parse a JSON array of journal entries.
pub fn parse_journal(json: &str) -> std::result::Result<Vec<JournalEntry>, serde_json::Error> {
    serde_json::from_str(json)
}

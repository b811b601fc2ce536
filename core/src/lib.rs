//! Staking Ledger Core
//!
//! Token accounting with staking rewards under a single owner:
//! - Spendable balances and circulating supply
//! - Stakes (burned from balance, minted back on removal)
//! - Owner-triggered reward distribution, holder-triggered withdrawal
//! - Operation journal with deterministic replay
//!
//! Callers are identified by an already-authenticated [`Address`].

pub mod access;
pub mod address;
pub mod balances;
pub mod error;
pub mod events;
pub mod journal;
pub mod ledger;
pub mod rewards;
pub mod shared;
pub mod stakes;

/// Token amount. Arithmetic on amounts is always checked.
pub type Amount = u128;

pub mod constants {
    use crate::Amount;

    /// Staked units per reward unit in one distribution round.
    pub const REWARD_RATE: Amount = 100;
}

pub use access::AccessController;
pub use address::{Address, AddressError, ADDRESS_LEN};
pub use balances::BalanceLedger;
pub use error::{InvariantViolation, LedgerError, Result};
pub use events::LedgerEvent;
pub use journal::{parse_journal, replay, EntryOutcome, JournalEntry, Operation, Receipt};
pub use ledger::StakingLedger;
pub use rewards::{calculate_reward, RewardDistributor};
pub use shared::SharedLedger;
pub use stakes::{StakeManager, StakeholderSet, NOT_A_STAKEHOLDER_INDEX};

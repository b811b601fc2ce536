//! Ledger error types

use thiserror::Error;

use crate::address::Address;
use crate::Amount;

/// Reasons a ledger operation is rejected.
///
/// A rejected operation never mutates state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("Insufficient stake: requested {requested}, available {available}")]
    InsufficientStake { requested: Amount, available: Amount },

    #[error("Caller {caller} is not the ledger owner")]
    NotOwner { caller: Address },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(&'static str),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// A broken ledger invariant. Always a defect, never an input error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("total supply {recorded} does not match sum of balances {computed}")]
    SupplyMismatch { recorded: Amount, computed: Amount },

    #[error("total stakes {recorded} does not match sum of stakes {computed}")]
    StakesMismatch { recorded: Amount, computed: Amount },

    #[error("total rewards {recorded} does not match sum of rewards {computed}")]
    RewardsMismatch { recorded: Amount, computed: Amount },

    #[error("stakeholder set out of sync for {0}")]
    StakeholderMismatch(Address),

    #[error("stakeholder {0} listed more than once")]
    DuplicateStakeholder(Address),

    #[error("counter overflowed while summing {0}")]
    SumOverflow(&'static str),
}

//! Ledger events emitted by successful transitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEvent {
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Minted {
        to: Address,
        amount: Amount,
    },
    Burned {
        from: Address,
        amount: Amount,
    },
    StakeholderAdded {
        account: Address,
    },
    StakeholderRemoved {
        account: Address,
    },
    RewardCredited {
        account: Address,
        amount: Amount,
    },
    RewardWithdrawn {
        account: Address,
        amount: Amount,
    },
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::Transfer { from, to, amount } => {
                write!(f, "transfer {} {} -> {}", amount, from, to)
            }
            LedgerEvent::Minted { to, amount } => write!(f, "mint {} -> {}", amount, to),
            LedgerEvent::Burned { from, amount } => write!(f, "burn {} from {}", amount, from),
            LedgerEvent::StakeholderAdded { account } => write!(f, "stakeholder + {}", account),
            LedgerEvent::StakeholderRemoved { account } => write!(f, "stakeholder - {}", account),
            LedgerEvent::RewardCredited { account, amount } => {
                write!(f, "reward +{} for {}", amount, account)
            }
            LedgerEvent::RewardWithdrawn { account, amount } => {
                write!(f, "reward withdrawn {} by {}", amount, account)
            }
        }
    }
}

//! Owner-only access control

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{LedgerError, Result};

/// Holds the ledger owner, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessController {
    owner: Address,
}

impl AccessController {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn require_owner(&self, caller: &Address) -> Result<()> {
        if *caller != self.owner {
            return Err(LedgerError::NotOwner { caller: *caller });
        }
        Ok(())
    }
}

//! Thread-safe ledger handle
//!
//! All mutation goes through one write lock held for the whole operation,
//! which serializes operations into single global transactions. Readers take
//! the read lock and only ever see the ledger between operations.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::address::Address;
use crate::error::Result;
use crate::journal::{Operation, Receipt};
use crate::ledger::StakingLedger;

#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<StakingLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: StakingLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn execute(&self, caller: &Address, operation: &Operation) -> Result<Receipt> {
        let mut ledger = self.inner.write();
        ledger.apply(caller, operation)
    }

    pub fn read<R>(&self, f: impl FnOnce(&StakingLedger) -> R) -> R {
        let ledger = self.inner.read();
        f(&ledger)
    }

    /// Point-in-time copy of the ledger state, e.g. for persistence.
    pub fn snapshot(&self) -> StakingLedger {
        self.inner.read().clone()
    }
}

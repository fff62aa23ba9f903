//! Administrative access control

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Single administrative principal, fixed when the ledger is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
}

impl AccessControl {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        &self.owner == caller
    }

    /// Fail with `NotAdmin` unless the caller is the owner
    pub fn ensure_owner(&self, caller: &Address) -> LedgerResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(LedgerError::NotAdmin(caller.clone()))
        }
    }
}

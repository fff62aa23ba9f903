//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ledger::LedgerState;
use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same snapshot, so several [`crate::Ledger`] handles can
/// write concurrently and rely on the version check to stay serializable.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<RwLock<Option<LedgerState>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the stored ledger (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        *self.write()? = None;
        Ok(())
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, Option<LedgerState>>> {
        self.state
            .read()
            .map_err(|_| LedgerError::Storage("state lock poisoned".to_string()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, Option<LedgerState>>> {
        self.state
            .write()
            .map_err(|_| LedgerError::Storage("state lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn initialize(&mut self, genesis: &LedgerState) -> LedgerResult<()> {
        let mut state = self.write()?;
        if state.is_some() {
            return Err(LedgerError::Storage(
                "ledger already initialized".to_string(),
            ));
        }
        *state = Some(genesis.clone());
        Ok(())
    }

    async fn load(&self) -> LedgerResult<LedgerState> {
        self.read()?.clone().ok_or(LedgerError::NotInitialized)
    }

    async fn current_version(&self) -> LedgerResult<u64> {
        self.read()?
            .as_ref()
            .map(LedgerState::version)
            .ok_or(LedgerError::NotInitialized)
    }

    async fn commit(&mut self, base_version: u64, next: &LedgerState) -> LedgerResult<()> {
        let mut state = self.write()?;
        let current = state.as_ref().ok_or(LedgerError::NotInitialized)?;

        if current.version() != base_version {
            return Err(LedgerError::VersionConflict {
                expected: base_version,
                found: current.version(),
            });
        }

        *state = Some(next.clone());
        Ok(())
    }
}

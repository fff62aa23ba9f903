//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::ledger::LedgerState;
use crate::types::*;

/// Storage abstraction for the ledger system
///
/// A backend stores whole [`LedgerState`] snapshots and commits them with an
/// optimistic version check, which is what keeps concurrent writers
/// serializable. Implement it for any store (in-memory, file, database).
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Store the genesis state. Fails if the backend already holds a ledger.
    async fn initialize(&mut self, genesis: &LedgerState) -> LedgerResult<()>;

    /// Latest committed snapshot
    async fn load(&self) -> LedgerResult<LedgerState>;

    /// Version of the latest committed snapshot
    async fn current_version(&self) -> LedgerResult<u64>;

    /// Replace the stored snapshot with `next`, but only if the stored
    /// version is still `base_version`. Otherwise returns
    /// [`LedgerError::VersionConflict`] and stores nothing.
    async fn commit(&mut self, base_version: u64, next: &LedgerState) -> LedgerResult<()>;
}

/// Trait for implementing custom hold validation rules
///
/// Runs before a hold request reaches the ledger state, on top of the
/// built-in checks (empty id, duplicates, balance, allowance).
pub trait HoldValidator: Send + Sync {
    fn validate_hold(&self, request: &HoldRequest) -> LedgerResult<()>;
}

/// Default hold validator with basic rules
pub struct DefaultHoldValidator;

impl HoldValidator for DefaultHoldValidator {
    fn validate_hold(&self, request: &HoldRequest) -> LedgerResult<()> {
        if request.id.is_empty() {
            return Err(LedgerError::EmptyHoldId);
        }

        if request.amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        Ok(())
    }
}

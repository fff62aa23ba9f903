//! Main ledger orchestrator that serializes operations against storage

use std::sync::Arc;

use crate::config::{LedgerConfig, DEFAULT_MAX_COMMIT_RETRIES};
use crate::ledger::{LedgerIntegrityReport, LedgerState};
use crate::traits::*;
use crate::types::*;

/// Main ledger system that orchestrates all token and hold operations
///
/// Each write loads the latest snapshot, applies one operation to a private
/// copy and commits it against the version it started from. A conflicting
/// commit by another handle makes the operation start over from the fresh
/// snapshot, so every committed state is the result of a serial history.
#[derive(Clone)]
pub struct Ledger<S: LedgerStorage> {
    storage: S,
    validator: Arc<dyn HoldValidator>,
    max_commit_retries: u32,
}

impl<S: LedgerStorage> Ledger<S> {
    /// Create a new ledger: write the genesis state into `storage`
    pub async fn create(mut storage: S, config: LedgerConfig) -> LedgerResult<Self> {
        let genesis = LedgerState::genesis(&config)?;
        storage.initialize(&genesis).await?;

        tracing::info!(
            name = %config.name,
            symbol = %config.symbol,
            owner = %config.owner,
            initial_supply = config.initial_supply,
            "ledger created"
        );

        Ok(Self {
            storage,
            validator: Arc::new(DefaultHoldValidator),
            max_commit_retries: config.max_commit_retries,
        })
    }

    /// Attach to a storage backend that already holds a ledger
    ///
    /// The commit retry limit is a property of the handle and is not stored
    /// with the ledger, so an opened handle starts at
    /// [`DEFAULT_MAX_COMMIT_RETRIES`] whatever limit `create` was given.
    /// Chain [`Ledger::with_max_commit_retries`] to use another one.
    pub fn open(storage: S) -> Self {
        Self {
            storage,
            validator: Arc::new(DefaultHoldValidator),
            max_commit_retries: DEFAULT_MAX_COMMIT_RETRIES,
        }
    }

    /// Replace the hold validator
    pub fn with_validator(mut self, validator: impl HoldValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_max_commit_retries(mut self, retries: u32) -> Self {
        self.max_commit_retries = retries.max(1);
        self
    }

    pub fn max_commit_retries(&self) -> u32 {
        self.max_commit_retries
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Latest committed state
    pub async fn snapshot(&self) -> LedgerResult<LedgerState> {
        self.storage.load().await
    }

    // Token operations
    /// Transfer unheld funds from the caller to `to`
    pub async fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> LedgerResult<()> {
        self.commit_with("transfer", |state| state.transfer(caller, to, amount))
            .await
    }

    /// Transfer unheld funds of `from` as an approved spender
    pub async fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.commit_with("transfer_from", |state| {
            state.transfer_from(caller, from, to, amount)
        })
        .await
    }

    /// Set the allowance of `spender` over the caller's funds
    pub async fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount) -> LedgerResult<()> {
        self.commit_with("approve", |state| state.approve(caller, spender, amount))
            .await
    }

    // Hold operations
    /// Place a hold on the caller's own funds in favour of `recipient`
    pub async fn hold(
        &mut self,
        caller: &Address,
        id: impl Into<HoldId>,
        recipient: &Address,
        amount: Amount,
    ) -> LedgerResult<Hold> {
        let request = HoldRequest::direct(id, caller.clone(), recipient.clone(), amount);
        self.place_hold(request).await
    }

    /// Place a hold on `payer`'s funds using the allowance granted to the caller
    pub async fn hold_from(
        &mut self,
        caller: &Address,
        id: impl Into<HoldId>,
        payer: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> LedgerResult<Hold> {
        let request =
            HoldRequest::delegated(id, caller.clone(), payer.clone(), recipient.clone(), amount);
        self.place_hold(request).await
    }

    async fn place_hold(&mut self, request: HoldRequest) -> LedgerResult<Hold> {
        self.validator.validate_hold(&request)?;

        let hold = self
            .commit_with("hold", |state| state.place_hold(request.clone()))
            .await?;

        tracing::info!(
            hold_id = %hold.id,
            payer = %hold.payer,
            recipient = %hold.recipient,
            creator = %hold.creator,
            amount = hold.amount,
            "hold placed"
        );
        Ok(hold)
    }

    /// Complete a hold as a transfer to its recipient. Only the creator may.
    pub async fn execute_hold(&mut self, caller: &Address, id: &HoldId) -> LedgerResult<Hold> {
        let hold = self
            .commit_with("execute_hold", |state| state.execute_hold(caller, id))
            .await?;

        tracing::info!(
            hold_id = %hold.id,
            payer = %hold.payer,
            recipient = %hold.recipient,
            amount = hold.amount,
            "hold executed"
        );
        Ok(hold)
    }

    /// Release a hold without moving funds. Only the owner may.
    pub async fn remove_hold(&mut self, caller: &Address, id: &HoldId) -> LedgerResult<Hold> {
        let hold = self
            .commit_with("remove_hold", |state| state.remove_hold(caller, id))
            .await?;

        tracing::info!(
            hold_id = %hold.id,
            payer = %hold.payer,
            amount = hold.amount,
            "hold removed"
        );
        Ok(hold)
    }

    // Reads
    pub async fn balance_of(&self, account: &Address) -> LedgerResult<Amount> {
        Ok(self.snapshot().await?.balance_of(account))
    }

    pub async fn held_balance_of(&self, account: &Address) -> LedgerResult<Amount> {
        Ok(self.snapshot().await?.held_balance_of(account))
    }

    pub async fn available_balance_of(&self, account: &Address) -> LedgerResult<Amount> {
        Ok(self.snapshot().await?.available_balance_of(account))
    }

    pub async fn allowance(&self, owner: &Address, spender: &Address) -> LedgerResult<Amount> {
        Ok(self.snapshot().await?.allowance(owner, spender))
    }

    pub async fn total_supply(&self) -> LedgerResult<Amount> {
        Ok(self.snapshot().await?.total_supply())
    }

    pub async fn get_hold(&self, id: &HoldId) -> LedgerResult<Option<Hold>> {
        Ok(self.snapshot().await?.get_hold(id).cloned())
    }

    /// Get a hold by ID, returning an error if not found
    pub async fn get_hold_required(&self, id: &HoldId) -> LedgerResult<Hold> {
        self.get_hold(id)
            .await?
            .ok_or_else(|| LedgerError::HoldNotFound(id.clone()))
    }

    pub async fn holds_of(&self, payer: &Address) -> LedgerResult<Vec<Hold>> {
        Ok(self.snapshot().await?.holds_of(payer))
    }

    pub async fn active_holds_of(&self, payer: &Address) -> LedgerResult<Vec<Hold>> {
        Ok(self.snapshot().await?.active_holds_of(payer))
    }

    pub async fn name(&self) -> LedgerResult<String> {
        Ok(self.snapshot().await?.name().to_string())
    }

    pub async fn symbol(&self) -> LedgerResult<String> {
        Ok(self.snapshot().await?.symbol().to_string())
    }

    pub async fn decimals(&self) -> LedgerResult<u8> {
        Ok(self.snapshot().await?.decimals())
    }

    pub async fn owner(&self) -> LedgerResult<Address> {
        Ok(self.snapshot().await?.owner().clone())
    }

    /// Validate the integrity of the ledger
    pub async fn validate_integrity(&self) -> LedgerResult<LedgerIntegrityReport> {
        let report = self.snapshot().await?.verify_integrity();
        if !report.is_valid {
            tracing::warn!(version = report.version, issues = ?report.issues, "ledger integrity check failed");
        }
        Ok(report)
    }

    /// Apply `operation` to the latest snapshot and commit it, starting over
    /// on version conflicts. Errors from `operation` are returned as-is and
    /// nothing is committed.
    async fn commit_with<T, F>(&mut self, operation: &'static str, mut apply: F) -> LedgerResult<T>
    where
        F: FnMut(&mut LedgerState) -> LedgerResult<T> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut state = self.storage.load().await?;
            let base_version = state.version();

            let output = match apply(&mut state) {
                Ok(output) => output,
                Err(e) => {
                    tracing::debug!(operation, version = base_version, error = %e, "operation rejected");
                    return Err(e);
                }
            };
            state.bump_version();

            match self.storage.commit(base_version, &state).await {
                Ok(()) => {
                    tracing::debug!(operation, version = state.version(), attempt, "committed");
                    return Ok(output);
                }
                Err(LedgerError::VersionConflict { expected, found })
                    if attempt < self.max_commit_retries =>
                {
                    tracing::warn!(operation, expected, found, attempt, "commit conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

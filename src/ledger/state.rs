//! Versioned ledger state: balances, allowances, holds and the owner
//!
//! Every operation takes the calling identity explicitly and either applies
//! completely or returns an error with the state untouched.

use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::ledger::{AccessControl, AccountBook, HoldRegistry};
use crate::types::*;

/// Complete state of one ledger at a given version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    version: u64,
    metadata: TokenMetadata,
    access: AccessControl,
    accounts: AccountBook,
    holds: HoldRegistry,
}

impl LedgerState {
    /// Build the initial state: the owner holds the whole supply
    pub fn genesis(config: &LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;

        Ok(Self {
            version: 0,
            metadata: TokenMetadata {
                name: config.name.clone(),
                symbol: config.symbol.clone(),
                decimals: DECIMALS,
            },
            access: AccessControl::new(config.owner.clone()),
            accounts: AccountBook::genesis(config.owner.clone(), config.initial_supply),
            holds: HoldRegistry::new(),
        })
    }

    /// Number of commits applied since genesis
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    // Metadata
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn owner(&self) -> &Address {
        self.access.owner()
    }

    // Balance operations
    pub fn total_supply(&self) -> Amount {
        self.accounts.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.accounts.balance_of(account)
    }

    pub fn held_balance_of(&self, account: &Address) -> Amount {
        self.holds.held_balance_of(account)
    }

    /// Part of the balance that is free for ordinary transfers
    pub fn available_balance_of(&self, account: &Address) -> Amount {
        self.balance_of(account)
            .saturating_sub(self.held_balance_of(account))
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.accounts.allowance(owner, spender)
    }

    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> LedgerResult<()> {
        let held = self.holds.held_balance_of(caller);
        self.accounts.transfer(caller, to, amount, held)
    }

    /// Move `amount` of `from`'s unheld funds on behalf of `from`, consuming
    /// the allowance `from` granted to the caller
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        self.accounts.check_allowance(from, caller, amount)?;

        let held = self.holds.held_balance_of(from);
        self.accounts.transfer(from, to, amount, held)?;
        self.accounts.spend_allowance(from, caller, amount)
    }

    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount) -> LedgerResult<()> {
        self.accounts.approve(caller, spender, amount)
    }

    // Hold operations
    /// Place a hold on the caller's own funds
    pub fn hold(
        &mut self,
        caller: &Address,
        id: impl Into<HoldId>,
        recipient: &Address,
        amount: Amount,
    ) -> LedgerResult<Hold> {
        let request = HoldRequest::direct(id, caller.clone(), recipient.clone(), amount);
        self.place_hold(request)
    }

    /// Place a hold on `payer`'s funds as an approved spender
    pub fn hold_from(
        &mut self,
        caller: &Address,
        id: impl Into<HoldId>,
        payer: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> LedgerResult<Hold> {
        let request =
            HoldRequest::delegated(id, caller.clone(), payer.clone(), recipient.clone(), amount);
        self.place_hold(request)
    }

    /// Register a prepared request; `hold` and `hold_from` both end here
    pub fn place_hold(&mut self, request: HoldRequest) -> LedgerResult<Hold> {
        self.holds
            .place(&mut self.accounts, request)
            .map(Hold::clone)
    }

    pub fn execute_hold(&mut self, caller: &Address, id: &HoldId) -> LedgerResult<Hold> {
        self.holds.execute(&mut self.accounts, caller, id)
    }

    /// Release a hold. Restricted to the owner.
    pub fn remove_hold(&mut self, caller: &Address, id: &HoldId) -> LedgerResult<Hold> {
        self.access.ensure_owner(caller)?;
        self.holds.remove(id)
    }

    pub fn get_hold(&self, id: &HoldId) -> Option<&Hold> {
        self.holds.get(id)
    }

    pub fn holds_of(&self, payer: &Address) -> Vec<Hold> {
        self.holds.holds_of(payer).cloned().collect()
    }

    pub fn active_holds_of(&self, payer: &Address) -> Vec<Hold> {
        self.holds
            .holds_of(payer)
            .filter(|hold| hold.is_active())
            .cloned()
            .collect()
    }

    pub fn holds(&self) -> &HoldRegistry {
        &self.holds
    }

    /// Check every ledger invariant against the current state
    pub fn verify_integrity(&self) -> LedgerIntegrityReport {
        let mut issues = Vec::new();

        let mut balance_sum: Amount = 0;
        for (account, balance) in self.accounts.balances() {
            match balance_sum.checked_add(balance) {
                Some(sum) => balance_sum = sum,
                None => issues.push("Sum of balances overflows".to_string()),
            }

            let held = self.holds.held_balance_of(account);
            if balance < held {
                issues.push(format!(
                    "Account {} holds {} but its balance is only {}",
                    account, held, balance
                ));
            }
        }

        if balance_sum != self.total_supply() {
            issues.push(format!(
                "Sum of balances {} differs from total supply {}",
                balance_sum,
                self.total_supply()
            ));
        }

        for payer in self.holds.payers() {
            let cached = self.holds.held_balance_of(payer);
            let recomputed = self.holds.recompute_held(payer);
            if cached != recomputed {
                issues.push(format!(
                    "Held total of {} is {} but active holds sum to {}",
                    payer, cached, recomputed
                ));
            }
        }

        for hold in self.holds.iter().filter(|hold| hold.is_active()) {
            if !self.holds.payers().any(|payer| payer == &hold.payer) {
                issues.push(format!(
                    "Active hold {} is missing from the held total of {}",
                    hold.id, hold.payer
                ));
            }
        }

        LedgerIntegrityReport {
            version: self.version,
            is_valid: issues.is_empty(),
            issues,
            total_supply: self.total_supply(),
            balance_sum,
            active_holds: self.holds.iter().filter(|hold| hold.is_active()).count(),
        }
    }
}

/// Report on ledger integrity and validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerIntegrityReport {
    pub version: u64,
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub total_supply: Amount,
    pub balance_sum: Amount,
    pub active_holds: usize,
}

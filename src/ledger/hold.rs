//! Hold registry: creation, execution and removal of holds
//!
//! The registry is append-only. Holds are never deleted, only moved to a
//! terminal status, so an id can never be handed out twice. The held total
//! of each payer is cached and kept equal to the sum of its active holds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::AccountBook;
use crate::types::*;

/// Registry of every hold ever placed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldRegistry {
    holds: HashMap<HoldId, Hold>,
    order: Vec<HoldId>,
    held_totals: HashMap<Address, Amount>,
}

impl HoldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the active holds where `account` is the payer
    pub fn held_balance_of(&self, account: &Address) -> Amount {
        self.held_totals.get(account).copied().unwrap_or(0)
    }

    pub fn get(&self, id: &HoldId) -> Option<&Hold> {
        self.holds.get(id)
    }

    pub fn contains(&self, id: &HoldId) -> bool {
        self.holds.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All holds in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Hold> {
        self.order.iter().filter_map(|id| self.holds.get(id))
    }

    /// Holds encumbering `payer`, any status, in creation order
    pub fn holds_of<'a>(&'a self, payer: &'a Address) -> impl Iterator<Item = &'a Hold> + 'a {
        self.iter().filter(move |hold| &hold.payer == payer)
    }

    /// Held total recomputed from the registry, ignoring the cache
    pub fn recompute_held(&self, payer: &Address) -> Amount {
        self.holds_of(payer)
            .filter(|hold| hold.is_active())
            .map(|hold| hold.amount)
            .sum()
    }

    /// Accounts that have a cached held total
    pub fn payers(&self) -> impl Iterator<Item = &Address> {
        self.held_totals.keys()
    }

    /// Register a new hold.
    ///
    /// Checks run in order: empty id, zero amount, duplicate id, available
    /// balance of the payer, and for delegated requests the allowance the
    /// payer granted to the creator. A delegated hold consumes that
    /// allowance immediately.
    pub fn place(&mut self, accounts: &mut AccountBook, request: HoldRequest) -> LedgerResult<&Hold> {
        if request.id.is_empty() {
            return Err(LedgerError::EmptyHoldId);
        }
        if request.amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if request.recipient.is_empty() {
            return Err(LedgerError::Validation(
                "Hold recipient cannot be empty".to_string(),
            ));
        }
        if self.contains(&request.id) {
            return Err(LedgerError::DuplicateHoldId(request.id));
        }

        let held = self.held_balance_of(&request.payer);
        accounts.check_available(&request.payer, held, request.amount)?;
        let new_held = held
            .checked_add(request.amount)
            .ok_or(LedgerError::Overflow)?;

        if request.is_delegated() {
            accounts.spend_allowance(&request.payer, &request.creator, request.amount)?;
        }

        tracing::debug!(
            hold_id = %request.id,
            payer = %request.payer,
            creator = %request.creator,
            amount = request.amount,
            "registering hold"
        );

        let id = request.id.clone();
        self.held_totals.insert(request.payer.clone(), new_held);
        self.order.push(id.clone());
        Ok(self.holds.entry(id).or_insert(Hold::new(request)))
    }

    /// Complete an active hold as a transfer from payer to recipient.
    /// Only the hold's creator may do this.
    pub fn execute(
        &mut self,
        accounts: &mut AccountBook,
        caller: &Address,
        id: &HoldId,
    ) -> LedgerResult<Hold> {
        let hold = self.active_hold(id)?;
        if &hold.creator != caller {
            return Err(LedgerError::NotHoldCreator {
                id: id.clone(),
                caller: caller.clone(),
            });
        }

        let (payer, recipient, amount) = (hold.payer.clone(), hold.recipient.clone(), hold.amount);
        let new_held = self.released_total(&payer, amount)?;
        accounts.move_funds(&payer, &recipient, amount)?;

        self.close(id, payer, new_held, HoldStatus::Executed)
    }

    /// Release an active hold without moving any funds. Authorization is
    /// checked by the caller of this method.
    pub fn remove(&mut self, id: &HoldId) -> LedgerResult<Hold> {
        let hold = self.active_hold(id)?;
        let payer = hold.payer.clone();
        let new_held = self.released_total(&payer, hold.amount)?;

        self.close(id, payer, new_held, HoldStatus::Removed)
    }

    fn active_hold(&self, id: &HoldId) -> LedgerResult<&Hold> {
        let hold = self
            .holds
            .get(id)
            .ok_or_else(|| LedgerError::HoldNotFound(id.clone()))?;
        if !hold.is_active() {
            return Err(LedgerError::HoldNotActive {
                id: id.clone(),
                status: hold.status,
            });
        }
        Ok(hold)
    }

    fn released_total(&self, payer: &Address, amount: Amount) -> LedgerResult<Amount> {
        self.held_balance_of(payer)
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)
    }

    fn close(
        &mut self,
        id: &HoldId,
        payer: Address,
        new_held: Amount,
        status: HoldStatus,
    ) -> LedgerResult<Hold> {
        let hold = self
            .holds
            .get_mut(id)
            .ok_or_else(|| LedgerError::HoldNotFound(id.clone()))?;
        hold.close(status);
        let closed = hold.clone();

        if new_held == 0 {
            self.held_totals.remove(&payer);
        } else {
            self.held_totals.insert(payer, new_held);
        }
        Ok(closed)
    }
}

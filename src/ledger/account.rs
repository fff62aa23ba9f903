//! Balance and allowance bookkeeping

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;

/// Per-account balances and spender allowances.
///
/// Every mutating method validates first and only then writes, so an `Err`
/// leaves the book exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBook {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    total_supply: Amount,
}

impl AccountBook {
    /// Create a book where the whole supply belongs to `owner`
    pub fn genesis(owner: Address, initial_supply: Amount) -> Self {
        let mut balances = HashMap::new();
        if initial_supply > 0 {
            balances.insert(owner, initial_supply);
        }
        Self {
            balances,
            allowances: HashMap::new(),
            total_supply: initial_supply,
        }
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Raw balance, including any portion on hold
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate over every account that has ever held a balance
    pub fn balances(&self) -> impl Iterator<Item = (&Address, Amount)> {
        self.balances.iter().map(|(account, amount)| (account, *amount))
    }

    /// Set an allowance, overwriting any previous value
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> LedgerResult<()> {
        if spender.is_empty() {
            return Err(LedgerError::Validation(
                "Spender address cannot be empty".to_string(),
            ));
        }

        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
        Ok(())
    }

    /// Fail with `AllowanceExceeded` if `spender` may not move `amount` of `owner`'s funds
    pub fn check_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        let allowance = self.allowance(owner, spender);
        if amount > allowance {
            return Err(LedgerError::AllowanceExceeded {
                owner: owner.clone(),
                spender: spender.clone(),
                allowance,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Consume part of an allowance
    pub fn spend_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.check_allowance(owner, spender, amount)?;
        let remaining = self.allowance(owner, spender) - amount;
        self.approve(owner, spender, remaining)
    }

    /// Fail with `InsufficientAvailableBalance` unless `amount` fits in the
    /// part of the balance that is not on hold
    pub fn check_available(&self, account: &Address, held: Amount, amount: Amount) -> LedgerResult<()> {
        let available = self.balance_of(account).saturating_sub(held);
        if amount > available {
            return Err(LedgerError::InsufficientAvailableBalance {
                account: account.clone(),
                available,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Ordinary transfer: only the unheld part of `from`'s balance may move
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        held: Amount,
    ) -> LedgerResult<()> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if to.is_empty() {
            return Err(LedgerError::Validation(
                "Recipient address cannot be empty".to_string(),
            ));
        }

        self.check_available(from, held, amount)?;
        self.move_funds(from, to, amount)
    }

    /// Move funds without looking at holds. Used when executing a hold,
    /// whose amount is already earmarked.
    pub(crate) fn move_funds(&mut self, from: &Address, to: &Address, amount: Amount) -> LedgerResult<()> {
        let from_balance = self.balance_of(from);
        let debited = from_balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientAvailableBalance {
                account: from.clone(),
                available: from_balance,
                requested: amount,
            })?;

        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}

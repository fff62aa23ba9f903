//! Validation utilities

use crate::traits::*;
use crate::types::*;

/// Longest hold id accepted by [`EnhancedHoldValidator`]
pub const MAX_HOLD_ID_LEN: usize = 128;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: Amount) -> LedgerResult<()> {
    if amount == 0 {
        Err(LedgerError::ZeroAmount)
    } else {
        Ok(())
    }
}

/// Validate that a hold id is usable
pub fn validate_hold_id(id: &HoldId) -> LedgerResult<()> {
    if id.is_empty() {
        return Err(LedgerError::EmptyHoldId);
    }

    if id.as_str().len() > MAX_HOLD_ID_LEN {
        return Err(LedgerError::Validation(format!(
            "Hold id cannot exceed {} characters",
            MAX_HOLD_ID_LEN
        )));
    }

    if id
        .as_str()
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(LedgerError::Validation(
            "Hold id cannot contain whitespace or control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an address is present
pub fn validate_address(address: &Address, role: &str) -> LedgerResult<()> {
    if address.is_empty() {
        return Err(LedgerError::Validation(format!(
            "{} address cannot be empty",
            role
        )));
    }
    Ok(())
}

/// Enhanced hold validator with detailed checks
pub struct EnhancedHoldValidator;

impl HoldValidator for EnhancedHoldValidator {
    fn validate_hold(&self, request: &HoldRequest) -> LedgerResult<()> {
        validate_hold_id(&request.id)?;
        validate_positive_amount(request.amount)?;
        validate_address(&request.payer, "Payer")?;
        validate_address(&request.recipient, "Recipient")?;
        validate_address(&request.creator, "Creator")?;

        // A hold in favour of the payer itself reserves nothing meaningful
        if request.payer == request.recipient {
            return Err(LedgerError::Validation(format!(
                "Payer {} cannot place a hold in its own favour",
                request.payer
            )));
        }

        Ok(())
    }
}

//! Conversion between decimal token amounts and integer base units

use bigdecimal::{BigDecimal, ToPrimitive};
use std::str::FromStr;

use crate::types::*;

/// Base units in one whole token
pub const UNITS_PER_TOKEN: u64 = 1_000_000_000_000_000_000;

/// Parse a decimal token amount (`"1000"`, `"0.25"`, `"1e3"`) into base units.
///
/// Rejects negative values and values with more than 18 fractional digits.
pub fn parse_units(value: &str) -> LedgerResult<Amount> {
    let decimal = BigDecimal::from_str(value.trim())
        .map_err(|e| LedgerError::Validation(format!("Invalid amount '{}': {}", value, e)))?;

    if decimal < BigDecimal::from(0) {
        return Err(LedgerError::Validation(format!(
            "Amount cannot be negative: {}",
            value
        )));
    }

    let scaled = decimal * BigDecimal::from(UNITS_PER_TOKEN);
    if !scaled.is_integer() {
        return Err(LedgerError::Validation(format!(
            "Amount {} has more than {} fractional digits",
            value, DECIMALS
        )));
    }

    let (digits, _) = scaled.with_scale(0).into_bigint_and_exponent();
    digits.to_u128().ok_or(LedgerError::Overflow)
}

/// Render base units as a decimal token amount without trailing zeros
pub fn format_units(amount: Amount) -> String {
    let per_token = Amount::from(UNITS_PER_TOKEN);
    let whole = amount / per_token;
    let fraction = amount % per_token;

    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:0width$}", fraction, width = DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

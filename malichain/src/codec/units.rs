//! Exact decimal ↔ base-unit conversion.

use alloy::primitives::U256;
use alloy::primitives::utils::{ParseUnits, format_units, parse_units};

use super::CodecError;

/// Convert a human-readable decimal amount into base units.
///
/// Parsing is exact: `"0.0001"` with 18 decimals is `10^14`, never a
/// float-rounded neighbour. Amounts with more fractional digits than
/// `decimals` are rejected rather than truncated.
///
/// # Errors
///
/// Returns an error for empty, malformed or negative amounts, or when the
/// fractional part is longer than `decimals`.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, CodecError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(CodecError::InvalidAmount(amount.to_owned()));
    }
    if trimmed.starts_with('-') {
        return Err(CodecError::NegativeAmount(trimmed.to_owned()));
    }
    let valid = trimmed.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && trimmed.bytes().filter(|&b| b == b'.').count() <= 1
        && trimmed != ".";
    if !valid {
        return Err(CodecError::InvalidAmount(trimmed.to_owned()));
    }
    if let Some((_, fraction)) = trimmed.split_once('.') {
        if fraction.len() > usize::from(decimals) {
            return Err(CodecError::ExcessPrecision {
                amount: trimmed.to_owned(),
                decimals,
            });
        }
    }

    match parse_units(trimmed, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(CodecError::NegativeAmount(trimmed.to_owned())),
        Err(e) => Err(CodecError::InvalidAmount(format!("{trimmed}: {e}"))),
    }
}

/// Render base units as a decimal string without trailing zeros.
///
/// # Errors
///
/// Returns an error if `decimals` is not a valid unit exponent.
pub fn from_base_units(value: U256, decimals: u8) -> Result<String, CodecError> {
    let formatted = format_units(value, decimals)
        .map_err(|e| CodecError::InvalidAmount(format!("{value}: {e}")))?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    Ok(trimmed.to_owned())
}

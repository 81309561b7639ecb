//! Conversions between decimal amounts and integer base units

use crate::error::{MinterError, MinterResult};

use ethers::types::U256;
use ethers::utils::{format_units, parse_units};

/// Decimals of the native currency
pub const ETHER_DECIMALS: u32 = 18;

/// Denominations we know how to convert: mwei, gwei, ether
const SUPPORTED_DECIMALS: [u32; 3] = [6, 9, 18];

/// Convert `amount` into the smallest unit for the given decimals.
///
/// Digits below the smallest unit are truncated.
pub fn to_base_units(amount: f64, decimals: u32) -> MinterResult<U256> {
    if !SUPPORTED_DECIMALS.contains(&decimals) {
        return Err(MinterError::UnsupportedDecimals(decimals));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(MinterError::InvalidAmount(amount.to_string()));
    }

    // f64 Display never uses exponent notation
    let repr = amount.to_string();
    let repr = match repr.split_once('.') {
        Some((int, frac)) if frac.len() > decimals as usize => {
            format!("{}.{}", int, &frac[..decimals as usize])
        }
        _ => repr,
    };

    let parsed = parse_units(repr.as_str(), decimals)
        .map_err(|e| MinterError::InvalidAmount(format!("{}: {}", repr, e)))?;
    Ok(parsed.into())
}

/// Convert a base-unit value into a decimal amount for display
pub fn from_base_units(value: U256, decimals: u32) -> MinterResult<f64> {
    let formatted = format_units(value, decimals)
        .map_err(|e| MinterError::InvalidAmount(e.to_string()))?;
    formatted
        .parse::<f64>()
        .map_err(|e| MinterError::InvalidAmount(format!("{}: {}", formatted, e)))
}

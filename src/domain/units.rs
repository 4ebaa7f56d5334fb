//! Decimal string <-> fixed-point token amount conversion

use alloy::primitives::U256;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid number: {0}")]
    Invalid(String),
    #[error("too many decimal places ({found}, max {max})")]
    TooPrecise { found: usize, max: u8 },
    #[error("amount overflows uint256")]
    Overflow,
}

/// Parse a user-entered decimal amount ("5", "5.0", ".25") into base units.
///
/// Fails instead of rounding when the input has more fractional digits than
/// `decimals`, so every accepted value is represented exactly.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256, UnitsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (integer_part, decimal_part) = match input.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (input, ""),
    };
    if integer_part.is_empty() && decimal_part.is_empty() {
        return Err(UnitsError::Invalid(input.to_string()));
    }
    if !integer_part.chars().all(|c| c.is_ascii_digit())
        || !decimal_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(UnitsError::Invalid(input.to_string()));
    }

    // Trailing zeros carry no value, "5.000" is as exact as "5".
    let decimal_part = decimal_part.trim_end_matches('0');
    if decimal_part.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            found: decimal_part.len(),
            max: decimals,
        });
    }

    let multiplier = U256::from(10u64).pow(U256::from(decimals));

    let integer = if integer_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(integer_part, 10).map_err(|_| UnitsError::Overflow)?
    };

    let fraction = if decimal_part.is_empty() {
        U256::ZERO
    } else {
        let padding = decimals as usize - decimal_part.len();
        let padded = format!("{}{}", decimal_part, "0".repeat(padding));
        U256::from_str_radix(&padded, 10).map_err(|_| UnitsError::Overflow)?
    };

    integer
        .checked_mul(multiplier)
        .and_then(|v| v.checked_add(fraction))
        .ok_or(UnitsError::Overflow)
}

/// Format base units as a decimal string with trailing zeros trimmed.
///
/// Whole values keep one fractional digit ("5.0") so that parsing the
/// output reproduces the original amount.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let frac = value % divisor;

    if frac.is_zero() {
        return format!("{}.0", whole);
    }

    let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}

/// Format with a fixed number of fractional digits (truncating), for compact display.
pub fn format_units_rounded(value: U256, decimals: u8, places: usize) -> String {
    let full = format_units(value, decimals);
    match full.split_once('.') {
        Some((whole, frac)) if places > 0 => {
            let mut frac: String = frac.chars().take(places).collect();
            while frac.len() < places {
                frac.push('0');
            }
            format!("{}.{}", whole, frac)
        }
        Some((whole, _)) => whole.to_string(),
        None => full,
    }
}

//! Precision-safe decimal arithmetic.
//!
//! All order amounts and prices are `rust_decimal::Decimal` (28
//! significant digits), so repeated multiply/divide cycles never pick up
//! binary floating-point drift.
//!
//! Discipline: `divide` by zero and overflow return `Err`, never a
//! sentinel. Callers inside the engine decide the fallback (zero).

use rust_decimal::prelude::*;

use super::error::ArithmeticError;

/// `a * b`, failing on overflow.
pub fn multiply(a: Decimal, b: Decimal) -> Result<Decimal, ArithmeticError> {
    a.checked_mul(b).ok_or(ArithmeticError::Overflow)
}

/// `a / b`, failing on a zero divisor or overflow.
pub fn divide(a: Decimal, b: Decimal) -> Result<Decimal, ArithmeticError> {
    if b.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    a.checked_div(b).ok_or(ArithmeticError::Overflow)
}

/// Truncates (rounds toward zero) to `decimals` fractional digits.
///
/// Matches on-chain precision limits: `1.999999999` at 8 decimals is
/// `1.99999999`, never `2`.
pub fn truncate_with_precision(value: Decimal, decimals: u32) -> Decimal {
    value
        .round_dp_with_strategy(decimals, RoundingStrategy::ToZero)
        .normalize()
}

/// `value * percentage / 100`.
pub fn percent_of(value: Decimal, percentage: Decimal) -> Result<Decimal, ArithmeticError> {
    divide(multiply(value, percentage)?, Decimal::ONE_HUNDRED)
}

/// Parses a `.`-separated decimal string.
pub fn parse(text: &str) -> Result<Decimal, ArithmeticError> {
    Decimal::from_str(text.trim()).map_err(|_| ArithmeticError::Malformed(text.to_string()))
}

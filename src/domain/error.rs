//! Typed domain errors.
//!
//! These never cross into order state: the engine maps arithmetic
//! failures to zero and surfaces percentage errors to the caller
//! before anything is scheduled.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure of a decimal operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// Divisor was exactly zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Result does not fit the 96-bit decimal mantissa.
    #[error("decimal overflow")]
    Overflow,

    /// Input could not be represented as a finite decimal.
    #[error("malformed numeric input: {0}")]
    Malformed(String),
}

/// Rejected balance-percentage request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PercentageError {
    /// Percentage outside `[0, 100]`.
    #[error("percentage must be within [0, 100], got {0}")]
    OutOfRange(Decimal),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

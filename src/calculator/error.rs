// Error types for the calculator engine

use thiserror::Error;

/// Arithmetic failure. Held in the operand slot and shown as result text,
/// never returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Cannot divide by zero")]
    DivisionByZero,
    /// Invalid root or power arguments
    #[error("Invalid input")]
    DomainError,
    /// Result does not fit the decimal type
    #[error("Overflow")]
    Overflow,
}

/// Rejected input call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("digit out of range: {0}")]
    InvalidDigit(u8),
}

//! Error types returned by fixed-point parsing and arithmetic.

use core::fmt::{Display, Formatter};
use std::error;

/// Errors produced while parsing, formatting, or operating on a [`ScaledInt`](crate::ScaledInt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    /// The input text was not a valid decimal literal.
    ///
    /// Carries the offending text so callers can report it without re-reading
    /// the original input.
    InvalidFormat {
        /// The text that failed to parse.
        input: String,
    },

    /// A division (or a scale conversion that divides internally) was
    /// attempted with a zero divisor.
    DivisionByZero,

    /// Converting a [`ScaledInt`](crate::ScaledInt) to a bounded fixed-width
    /// integer type would lose magnitude.
    Overflow {
        /// Name of the target type the conversion was attempted into.
        target: &'static str,
    },
}

impl error::Error for FixedPointError {}

impl Display for FixedPointError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            FixedPointError::InvalidFormat { input } => {
                write!(f, "invalid decimal literal: {input:?}")
            }
            FixedPointError::DivisionByZero => write!(f, "division by zero"),
            FixedPointError::Overflow { target } => {
                write!(f, "value does not fit in {target}")
            }
        }
    }
}

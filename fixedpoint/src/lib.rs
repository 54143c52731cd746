//! Arbitrary-precision fixed-point decimal arithmetic.
//!
//! A [`ScaledInt`] pairs an arbitrary-precision integer with a non-negative
//! `scale`, denoting the rational value `value * 10^-scale`. All higher-level
//! monetary and unit-of-measure libraries in this workspace build on this
//! crate; it has no knowledge of currencies, units, or tax rates itself.

mod error;
mod rounding;
mod scaled;

pub use error::FixedPointError;
pub use rounding::RoundingMode;
pub use scaled::ScaledInt;

pub use num_bigint::BigInt;

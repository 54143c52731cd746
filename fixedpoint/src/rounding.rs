//! Rounding modes shared by division and scale conversion.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// How to resolve the remainder left over by an inexact division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Discard the remainder; round toward zero.
    Truncate,
    /// Round toward positive infinity.
    Ceil,
    /// Round toward negative infinity.
    Floor,
    /// Round half to even (banker's rounding).
    Round,
}

impl RoundingMode {
    /// Applies this rounding mode to a quotient/remainder/divisor triple
    /// produced by truncating division (`quotient = dividend / divisor`,
    /// `remainder = dividend - quotient * divisor`, using Rust's
    /// truncating-toward-zero integer division semantics).
    ///
    /// `divisor` must be non-zero; callers are expected to have already
    /// rejected zero divisors with [`FixedPointError::DivisionByZero`](crate::FixedPointError::DivisionByZero).
    pub(crate) fn resolve(self, quotient: &BigInt, remainder: &BigInt, divisor: &BigInt) -> BigInt {
        if remainder.is_zero() {
            return quotient.clone();
        }
        match self {
            RoundingMode::Truncate => quotient.clone(),
            RoundingMode::Ceil => {
                if remainder.is_positive() {
                    quotient + 1
                } else {
                    quotient.clone()
                }
            }
            RoundingMode::Floor => {
                if remainder.is_negative() {
                    quotient - 1
                } else {
                    quotient.clone()
                }
            }
            RoundingMode::Round => {
                let twice_rem = remainder.abs() * 2;
                let divisor_abs = divisor.abs();
                let away_from_zero = if quotient.is_negative() {
                    quotient - 1
                } else {
                    quotient + 1
                };
                match twice_rem.cmp(&divisor_abs) {
                    core::cmp::Ordering::Less => quotient.clone(),
                    core::cmp::Ordering::Greater => away_from_zero,
                    core::cmp::Ordering::Equal => {
                        // Exact half: round to even.
                        if quotient_is_even(quotient) {
                            quotient.clone()
                        } else {
                            away_from_zero
                        }
                    }
                }
            }
        }
    }
}

fn quotient_is_even(q: &BigInt) -> bool {
    (q % 2u8).is_zero()
}

#[cfg(test)]
mod test {
    use super::*;

    fn triple(dividend: i64, divisor: i64) -> (BigInt, BigInt, BigInt) {
        let dividend = BigInt::from(dividend);
        let divisor = BigInt::from(divisor);
        let quotient = &dividend / &divisor;
        let remainder = &dividend - &quotient * &divisor;
        (quotient, remainder, divisor)
    }

    #[test]
    fn truncate_toward_zero() {
        let (q, r, d) = triple(-7, 2);
        assert_eq!(RoundingMode::Truncate.resolve(&q, &r, &d), BigInt::from(-3));
    }

    #[test]
    fn ceil_rounds_up_on_positive_remainder() {
        let (q, r, d) = triple(7, 2);
        assert_eq!(RoundingMode::Ceil.resolve(&q, &r, &d), BigInt::from(4));
    }

    #[test]
    fn floor_rounds_down_on_negative_remainder() {
        let (q, r, d) = triple(-7, 2);
        assert_eq!(RoundingMode::Floor.resolve(&q, &r, &d), BigInt::from(-4));
    }

    #[test]
    fn bankers_rounding_half_to_even() {
        // 15 / 10 = 1.5 -> 2 (away from even 1)
        let (q, r, d) = triple(15, 10);
        assert_eq!(RoundingMode::Round.resolve(&q, &r, &d), BigInt::from(2));
        // 25 / 10 = 2.5 -> 2 (2 already even)
        let (q, r, d) = triple(25, 10);
        assert_eq!(RoundingMode::Round.resolve(&q, &r, &d), BigInt::from(2));
        // 35 / 10 = 3.5 -> 4 (away from odd 3)
        let (q, r, d) = triple(35, 10);
        assert_eq!(RoundingMode::Round.resolve(&q, &r, &d), BigInt::from(4));
    }
}

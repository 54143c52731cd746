//! The scaled-integer value type and its arithmetic.

use core::cmp::Ordering;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use tracing::{instrument, trace};

use crate::error::FixedPointError;
use crate::rounding::RoundingMode;

/// An arbitrary-precision decimal value represented as an integer `value`
/// scaled by `10^-scale`.
///
/// Two `ScaledInt`s can only be combined directly (`add`, `subtract`) when
/// their scales match; [`ScaledInt::convert_scale`] reconciles mismatched
/// scales first. There is no negative-zero: `ScaledInt::zero(s).value` is
/// always exactly `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScaledInt {
    value: BigInt,
    scale: u32,
}

impl ScaledInt {
    /// Builds a `ScaledInt` directly from an already-scaled integer.
    pub fn new(value: BigInt, scale: u32) -> Self {
        ScaledInt { value, scale }
    }

    /// The zero value at the given scale.
    pub fn zero(scale: u32) -> Self {
        ScaledInt { value: BigInt::zero(), scale }
    }

    /// The underlying scaled integer.
    pub fn value(&self) -> &BigInt {
        &self.value
    }

    /// The number of implied decimal places.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Parses a decimal literal (optional sign, digits, optional `.`
    /// fraction) into a `ScaledInt` at the given scale.
    ///
    /// If the literal's fractional part carries more digits than `scale`,
    /// the excess digits are resolved with `mode`. Trailing zeros beyond
    /// `scale` never change the result regardless of `mode`.
    #[instrument(skip(text), fields(scale, mode = ?mode))]
    pub fn parse(text: &str, scale: u32, mode: RoundingMode) -> Result<Self, FixedPointError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FixedPointError::InvalidFormat { input: text.to_string() });
        }

        let (negative, unsigned) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        if unsigned.is_empty() {
            return Err(FixedPointError::InvalidFormat { input: text.to_string() });
        }

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(FixedPointError::InvalidFormat { input: text.to_string() });
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(FixedPointError::InvalidFormat { input: text.to_string() });
        }

        let scale_usize = scale as usize;
        let mut digits = String::with_capacity(int_part.len() + scale_usize + 1);
        digits.push_str(if int_part.is_empty() { "0" } else { int_part });

        let kept_frac;
        let excess_frac;
        if frac_part.len() > scale_usize {
            kept_frac = &frac_part[..scale_usize];
            excess_frac = &frac_part[scale_usize..];
        } else {
            kept_frac = frac_part;
            excess_frac = "";
        }
        digits.push_str(kept_frac);
        for _ in 0..(scale_usize - kept_frac.len()) {
            digits.push('0');
        }

        let mut magnitude: BigInt = digits
            .parse()
            .map_err(|_| FixedPointError::InvalidFormat { input: text.to_string() })?;

        if !excess_frac.is_empty() && excess_frac.bytes().any(|b| b != b'0') {
            trace!(excess = excess_frac, "rounding excess fractional digits");
            let divisor = ten_pow(excess_frac.len() as u32);
            let signed_magnitude = if negative { -&magnitude } else { magnitude.clone() };
            let quotient = &signed_magnitude / &divisor;
            let remainder = &signed_magnitude - &quotient * &divisor;
            let rounded = mode.resolve(&quotient, &remainder, &divisor);
            return Ok(ScaledInt { value: rounded, scale });
        }

        if negative {
            magnitude = -magnitude;
        }
        Ok(ScaledInt { value: magnitude, scale })
    }

    /// Renders this value as a decimal literal.
    ///
    /// When `scale` is `0` no decimal point is emitted. Otherwise the integer
    /// part is zero-padded so at least `scale + 1` digits exist, then split
    /// at `len - scale`. When `trim_trailing_zeros` is set, trailing
    /// fractional zeros (and a now-dangling `.`) are removed.
    pub fn format(&self, trim_trailing_zeros: bool) -> String {
        let negative = self.value.is_negative();
        let magnitude = self.value.abs().to_string();

        if self.scale == 0 {
            return if negative { format!("-{magnitude}") } else { magnitude };
        }

        let scale = self.scale as usize;
        let padded = if magnitude.len() < scale + 1 {
            format!("{:0>width$}", magnitude, width = scale + 1)
        } else {
            magnitude
        };
        let split_at = padded.len() - scale;
        let (int_part, frac_part) = padded.split_at(split_at);

        let mut frac = frac_part;
        if trim_trailing_zeros {
            frac = frac.trim_end_matches('0');
        }

        let mut out = String::with_capacity(padded.len() + 2);
        if negative {
            out.push('-');
        }
        out.push_str(int_part);
        if !frac.is_empty() {
            out.push('.');
            out.push_str(frac);
        }
        out
    }

    /// Adds two values of the same scale.
    ///
    /// # Panics
    /// Panics if `self.scale() != other.scale()` — callers must reconcile
    /// scales with [`ScaledInt::convert_scale`] first, per spec: "all binary
    /// operations require matched `s`".
    pub fn add(&self, other: &Self) -> Self {
        assert_eq!(self.scale, other.scale, "ScaledInt::add requires matched scales");
        ScaledInt { value: &self.value + &other.value, scale: self.scale }
    }

    /// Subtracts `other` from `self`, both at the same scale.
    ///
    /// # Panics
    /// Panics on scale mismatch; see [`ScaledInt::add`].
    pub fn subtract(&self, other: &Self) -> Self {
        assert_eq!(self.scale, other.scale, "ScaledInt::subtract requires matched scales");
        ScaledInt { value: &self.value - &other.value, scale: self.scale }
    }

    /// Multiplies two values of the same scale, preserving that scale.
    ///
    /// Note this multiplies the raw scaled integers directly, so the
    /// mathematical result is scaled by `10^-s` rather than `10^-2s`; callers
    /// wanting a product at the "natural" doubled scale should convert after.
    ///
    /// # Panics
    /// Panics on scale mismatch; see [`ScaledInt::add`].
    pub fn multiply(&self, other: &Self) -> Self {
        assert_eq!(self.scale, other.scale, "ScaledInt::multiply requires matched scales");
        ScaledInt { value: &self.value * &other.value, scale: self.scale }
    }

    /// Divides `self` by `other`, both at the same scale, producing a result
    /// at that scale, rounded per `mode`.
    #[instrument(skip(self, other), fields(scale = self.scale, mode = ?mode))]
    pub fn divide(&self, other: &Self, mode: RoundingMode) -> Result<Self, FixedPointError> {
        assert_eq!(self.scale, other.scale, "ScaledInt::divide requires matched scales");
        if other.value.is_zero() {
            return Err(FixedPointError::DivisionByZero);
        }
        let scaled_dividend = &self.value * ten_pow(self.scale);
        let quotient = &scaled_dividend / &other.value;
        let remainder = &scaled_dividend - &quotient * &other.value;
        let rounded = mode.resolve(&quotient, &remainder, &other.value);
        Ok(ScaledInt { value: rounded, scale: self.scale })
    }

    /// Converts this value from its current scale to `to_scale`.
    ///
    /// Scaling up multiplies exactly; scaling down divides using `mode`.
    #[instrument(skip(self), fields(from_scale = self.scale, to_scale, mode = ?mode))]
    pub fn convert_scale(&self, to_scale: u32, mode: RoundingMode) -> Self {
        match to_scale.cmp(&self.scale) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => {
                let factor = ten_pow(to_scale - self.scale);
                ScaledInt { value: &self.value * factor, scale: to_scale }
            }
            Ordering::Less => {
                let divisor = ten_pow(self.scale - to_scale);
                let quotient = &self.value / &divisor;
                let remainder = &self.value - &quotient * &divisor;
                let rounded = mode.resolve(&quotient, &remainder, &divisor);
                ScaledInt { value: rounded, scale: to_scale }
            }
        }
    }

    /// Converts this value to an `i64`, failing with
    /// [`FixedPointError::Overflow`] if it does not fit.
    ///
    /// The scale is not consulted: this returns the raw scaled integer, not
    /// the represented rational value divided back to an integer. Callers
    /// wanting the latter should `convert_scale(0, mode)` first.
    pub fn to_i64(&self) -> Result<i64, FixedPointError> {
        self.value
            .to_i64()
            .ok_or(FixedPointError::Overflow { target: "i64" })
    }

    /// Converts this value to an `i128`, failing with
    /// [`FixedPointError::Overflow`] if it does not fit.
    pub fn to_i128(&self) -> Result<i128, FixedPointError> {
        self.value
            .to_i128()
            .ok_or(FixedPointError::Overflow { target: "i128" })
    }
}

fn ten_pow(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

#[cfg(test)]
mod test {
    use super::*;

    fn p(text: &str, scale: u32) -> ScaledInt {
        ScaledInt::parse(text, scale, RoundingMode::Truncate).unwrap()
    }

    #[test]
    fn parse_basic() {
        assert_eq!(p("100.00", 2).value(), &BigInt::from(10_000));
        assert_eq!(p("-1.5", 2).value(), &BigInt::from(-150));
        assert_eq!(p("3", 2).value(), &BigInt::from(300));
        assert_eq!(p(".5", 2).value(), &BigInt::from(50));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(ScaledInt::parse("", 2, RoundingMode::Truncate).is_err());
        assert!(ScaledInt::parse("abc", 2, RoundingMode::Truncate).is_err());
        assert!(ScaledInt::parse("1.2.3", 2, RoundingMode::Truncate).is_err());
        assert!(ScaledInt::parse("-", 2, RoundingMode::Truncate).is_err());
    }

    #[test]
    fn parse_rounds_excess_fraction_digits() {
        // 1.005 truncated at scale 2 -> 1.00
        assert_eq!(
            ScaledInt::parse("1.005", 2, RoundingMode::Truncate).unwrap().value(),
            &BigInt::from(100)
        );
        // 1.005 rounded (banker's) at scale 2 -> 1.00 (half to even)
        assert_eq!(
            ScaledInt::parse("1.005", 2, RoundingMode::Round).unwrap().value(),
            &BigInt::from(100)
        );
        // trailing zeros past scale never change the result
        assert_eq!(
            ScaledInt::parse("1.2000", 1, RoundingMode::Round).unwrap().value(),
            &BigInt::from(12)
        );
    }

    #[test]
    fn format_basic() {
        assert_eq!(ScaledInt::new(BigInt::from(10_000), 2).format(false), "100.00");
        assert_eq!(ScaledInt::new(BigInt::from(-150), 2).format(false), "-1.50");
        assert_eq!(ScaledInt::new(BigInt::from(5), 2).format(false), "0.05");
        assert_eq!(ScaledInt::new(BigInt::from(500), 0).format(false), "500");
    }

    #[test]
    fn format_trims_trailing_zeros() {
        assert_eq!(ScaledInt::new(BigInt::from(10_000), 2).format(true), "100");
        assert_eq!(ScaledInt::new(BigInt::from(10_050), 2).format(true), "100.5");
    }

    #[test]
    fn parse_format_roundtrip_with_truncate() {
        for (text, scale) in [("0", 0), ("123.45", 2), ("-7.001", 3), ("0.00", 2)] {
            let parsed = p(text, scale);
            let formatted = parsed.format(false);
            let reparsed = ScaledInt::parse(&formatted, scale, RoundingMode::Truncate).unwrap();
            assert_eq!(parsed.value(), reparsed.value(), "roundtrip failed for {text}");
        }
    }

    #[test]
    fn divide_bankers_rounding_scenarios() {
        // divide(100, 3, s=2, round) over scaled integers (10_000, 3) -> 3_333
        let a = ScaledInt::new(BigInt::from(10_000), 2);
        let b = ScaledInt::new(BigInt::from(300), 2);
        assert_eq!(a.divide(&b, RoundingMode::Round).unwrap().value(), &BigInt::from(3_333));

        let one_five = ScaledInt::new(BigInt::from(15), 0);
        let ten = ScaledInt::new(BigInt::from(10), 0);
        assert_eq!(one_five.divide(&ten, RoundingMode::Round).unwrap().value(), &BigInt::from(2));

        let two_five = ScaledInt::new(BigInt::from(25), 0);
        assert_eq!(two_five.divide(&ten, RoundingMode::Round).unwrap().value(), &BigInt::from(2));

        let three_five = ScaledInt::new(BigInt::from(35), 0);
        assert_eq!(three_five.divide(&ten, RoundingMode::Round).unwrap().value(), &BigInt::from(4));
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        let a = ScaledInt::new(BigInt::from(10), 0);
        let zero = ScaledInt::zero(0);
        assert_eq!(
            a.divide(&zero, RoundingMode::Truncate).unwrap_err(),
            FixedPointError::DivisionByZero
        );
    }

    #[test]
    fn divide_truncate_satisfies_division_identity() {
        // quot * b + rem = a
        let a = ScaledInt::new(BigInt::from(37), 0);
        let b = ScaledInt::new(BigInt::from(6), 0);
        let quot = a.divide(&b, RoundingMode::Truncate).unwrap();
        let rem = a.value() - quot.value() * b.value();
        assert_eq!(quot.value() * b.value() + &rem, *a.value());
    }

    #[test]
    fn convert_scale_up_then_down_is_identity() {
        let v = p("42.7", 1);
        let up = v.convert_scale(5, RoundingMode::Truncate);
        let back = up.convert_scale(1, RoundingMode::Truncate);
        assert_eq!(v.value(), back.value());
    }

    #[test]
    fn convert_scale_down_rounds() {
        let v = ScaledInt::new(BigInt::from(125), 2); // 1.25
        assert_eq!(v.convert_scale(1, RoundingMode::Round).value(), &BigInt::from(12)); // 1.2 (half to even)
        assert_eq!(v.convert_scale(0, RoundingMode::Ceil).value(), &BigInt::from(2));
    }

    #[test]
    fn overflow_reports_target_type() {
        let huge = ScaledInt::new(BigInt::from(10u8).pow(40), 0);
        assert_eq!(huge.to_i64().unwrap_err(), FixedPointError::Overflow { target: "i64" });
    }
}

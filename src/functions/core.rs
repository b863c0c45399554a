//! # core.rs
//!
//! Core trait definitions for numeric operations.
//!
//! This module defines the `NumericBackend` trait which abstracts the number
//! type carried by `Node::Number`, enabling different implementations to be
//! used interchangeably:
//!
//! - `f64`: ordinary floating point.
//! - `BigRational`: exact decimal literals and exact `+ - * /`, with integer
//!   powers computed exactly. Everything else goes through `f64`.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// Number of decimal places kept by transcendental results.
pub(crate) const ROUNDING_PLACES: i32 = 12;

/// Fractional digits shown when rendering a non-integral exact value.
const RENDER_PLACES: usize = 20;

/// Largest power of ten accepted when reading an exact literal.
const MAX_DECIMAL_SCALE: i64 = 4096;

/// Largest integer exponent computed exactly by the rational backend.
const MAX_EXACT_EXPONENT: i32 = 4096;

/// Rounds `value` to [`ROUNDING_PLACES`] decimal places.
///
/// Values too large to carry that many decimals in an `f64` are returned
/// unchanged, as are infinities and NaN.
pub(crate) fn round_places(value: f64) -> f64 {
    let factor = 10f64.powi(ROUNDING_PLACES);
    if !value.is_finite() || value.abs() >= 1.0e15 {
        return value;
    }
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Rounds `value` to [`ROUNDING_PLACES`] significant digits.
///
/// Used for `^`, whose results span any magnitude: `1.1 ^ 2` gives `1.21`
/// while `10 ^ -13` keeps its value.
pub(crate) fn round_significant(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    let digits = (ROUNDING_PLACES - 1) as usize;
    format!("{value:.digits$e}").parse().unwrap_or(value)
}

/// Trait for the numeric type of an expression session.
///
/// Fallible operations return `None` when the result is not representable by
/// the backend; callers turn that into `Error::NumericDomain`.
pub trait NumericBackend: Clone + std::fmt::Debug + PartialEq + PartialOrd + 'static {
    /// Reads a decimal literal such as `12`, `0.5` or `6.02e23`.
    fn parse_literal(text: &str) -> Option<Self>;

    fn from_f64(value: f64) -> Option<Self>;
    fn to_f64(&self) -> f64;

    fn plus(&self, rhs: &Self) -> Option<Self>;
    fn minus(&self, rhs: &Self) -> Option<Self>;
    fn times(&self, rhs: &Self) -> Option<Self>;
    fn divide(&self, rhs: &Self) -> Option<Self>;
    fn power(&self, rhs: &Self) -> Option<Self>;
    fn negate(&self) -> Self;

    /// The value as a zero-based index, if it is a non-negative integer.
    fn to_index(&self) -> Option<usize>;
    fn is_integral(&self) -> bool;

    /// Canonical decimal rendering. Negative zero renders as `0`.
    fn canonical(&self) -> String;
}

impl NumericBackend for f64 {
    fn parse_literal(text: &str) -> Option<Self> { text.parse::<f64>().ok() }

    fn from_f64(value: f64) -> Option<Self> { Some(value) }
    fn to_f64(&self) -> f64 { *self }

    fn plus(&self, rhs: &Self) -> Option<Self> { Some(self + rhs) }
    fn minus(&self, rhs: &Self) -> Option<Self> { Some(self - rhs) }
    fn times(&self, rhs: &Self) -> Option<Self> { Some(self * rhs) }
    fn divide(&self, rhs: &Self) -> Option<Self> { Some(self / rhs) }
    fn power(&self, rhs: &Self) -> Option<Self> { Some(round_significant(self.powf(*rhs))) }
    fn negate(&self) -> Self { -self }

    fn to_index(&self) -> Option<usize> {
        (self.is_integral() && *self >= 0.0 && *self <= usize::MAX as f64).then_some(*self as usize)
    }

    fn is_integral(&self) -> bool { self.is_finite() && self.fract() == 0.0 }

    fn canonical(&self) -> String {
        if *self == 0.0 {
            "0".to_string()
        } else {
            format!("{}", self)
        }
    }
}

/// Reads `[-]digits[.digits][e[+-]digits]` exactly.
fn parse_decimal(text: &str) -> Option<BigRational> {
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(idx) => (&text[..idx], text[idx + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let digits = BigInt::parse_bytes(format!("{int_part}{frac_part}").as_bytes(), 10)?;
    let scale = exponent.checked_sub(frac_part.len() as i64)?;
    if scale.abs() > MAX_DECIMAL_SCALE {
        return None;
    }
    let ten_pow = num_traits::pow(BigInt::from(10u32), scale.unsigned_abs() as usize);
    let value = if scale >= 0 {
        BigRational::from_integer(digits * ten_pow)
    } else {
        BigRational::new(digits, ten_pow)
    };
    Some(if negative { -value } else { value })
}

/// Implementation of `NumericBackend` for `num_rational::BigRational`.
impl NumericBackend for BigRational {
    fn parse_literal(text: &str) -> Option<Self> { parse_decimal(text) }

    fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // shortest round-trip rendering keeps `0.1` as 1/10
        parse_decimal(&format!("{}", value))
    }

    fn to_f64(&self) -> f64 { ToPrimitive::to_f64(self).unwrap_or(f64::NAN) }

    fn plus(&self, rhs: &Self) -> Option<Self> { Some(self + rhs) }
    fn minus(&self, rhs: &Self) -> Option<Self> { Some(self - rhs) }
    fn times(&self, rhs: &Self) -> Option<Self> { Some(self * rhs) }

    fn divide(&self, rhs: &Self) -> Option<Self> {
        if rhs.is_zero() { None } else { Some(self / rhs) }
    }

    fn power(&self, rhs: &Self) -> Option<Self> {
        if rhs.is_integer() {
            if let Some(exp) = rhs.to_integer().to_i32().filter(|e| e.abs() <= MAX_EXACT_EXPONENT) {
                if self.is_zero() && exp < 0 {
                    return None;
                }
                return Some(self.pow(exp));
            }
        }
        let value = NumericBackend::to_f64(self).powf(NumericBackend::to_f64(rhs));
        Self::from_f64(round_significant(value))
    }

    fn negate(&self) -> Self { -self.clone() }

    fn to_index(&self) -> Option<usize> {
        if self.is_integer() && !self.is_negative() {
            self.to_integer().to_usize()
        } else {
            None
        }
    }

    fn is_integral(&self) -> bool { self.is_integer() }

    fn canonical(&self) -> String {
        if self.is_integer() {
            return self.to_integer().to_string();
        }
        let scale = num_traits::pow(BigInt::from(10u32), RENDER_PLACES);
        let scaled = (self * BigRational::from_integer(scale)).round().to_integer();
        if scaled.is_zero() {
            return "0".to_string();
        }

        let digits = format!("{:0>width$}", scaled.abs().to_string(), width = RENDER_PLACES + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - RENDER_PLACES);
        let frac_part = frac_part.trim_end_matches('0');
        let sign = if scaled.is_negative() { "-" } else { "" };
        if frac_part.is_empty() {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{frac_part}")
        }
    }
}

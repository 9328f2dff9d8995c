//! Numbers carried through unit conversion
//!
//! A `Number` remembers the kind it was created with. Integers and exact
//! rationals (dashu-int / dashu-ratio) stay exact through every affine
//! conversion, decimals (dashu-float) are computed exactly and rounded back
//! to the working precision, floats are plain f64.

use dashu_float::DBig;
use dashu_float::ops::SquareRoot;
use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use serde::{Deserialize, Serialize, Serializer, Deserializer};
use std::cmp::Ordering;
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    DomainError(String),
}

/// Working precision for decimal values (significant digits)
pub const DEFAULT_PRECISION: usize = 50;

/// Largest power of ten accepted when parsing, in either direction
pub const MAX_EXPONENT: u32 = 1000;

/// The representation a `Number` was created with.
///
/// Ordered by width: combining two numbers yields the wider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Integer,
    Rational,
    Decimal,
    Float,
}

/// A numeric value of a measurement
#[derive(Debug, Clone)]
pub enum Number {
    Integer(IBig),
    Rational(RBig),
    Decimal(DBig),
    Float(f64),
}

impl Number {
    // ========== Construction ==========

    /// Create from string representation
    /// Supports: "123" (integer), "1/3" (rational), "3.14" and "1.5e10" (decimal)
    pub fn from_str(s: &str) -> Result<Self, NumberError> {
        let s = s.trim();
        if s.contains('/') {
            return Ok(Number::Rational(parse_rational(s)?));
        }

        let digits = s.strip_prefix('-').or_else(|| s.strip_prefix('+')).unwrap_or(s);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            let n: IBig = s.trim_start_matches('+').parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;
            return Ok(Number::Integer(n));
        }

        let exact = parse_rational(s)?;
        Ok(Number::Decimal(rational_to_decimal(&exact)))
    }

    pub fn from_i64(n: i64) -> Self {
        Number::Integer(IBig::from(n))
    }

    /// Create an exact ratio `num / den`
    pub fn from_ratio(num: i64, den: i64) -> Result<Self, NumberError> {
        if den == 0 {
            return Err(NumberError::DivisionByZero);
        }
        Ok(Number::Rational(RBig::from(IBig::from(num)) / RBig::from(IBig::from(den))))
    }

    pub fn from_rational(r: RBig) -> Self {
        Number::Rational(r)
    }

    pub fn from_f64(f: f64) -> Self {
        Number::Float(f)
    }

    /// Build a number of the given kind from an exact rational result.
    ///
    /// Integer kind only survives when the result is integral.
    pub fn from_exact(r: RBig, kind: NumberKind) -> Self {
        match kind {
            NumberKind::Integer if is_integral(&r) => Number::Integer(r.numerator().clone()),
            NumberKind::Integer | NumberKind::Rational => Number::Rational(r),
            NumberKind::Decimal => Number::Decimal(rational_to_decimal(&r)),
            NumberKind::Float => Number::Float(rational_to_f64(&r).unwrap_or(f64::NAN)),
        }
    }

    // ========== Predicates ==========

    pub fn kind(&self) -> NumberKind {
        match self {
            Number::Integer(_) => NumberKind::Integer,
            Number::Rational(_) => NumberKind::Rational,
            Number::Decimal(_) => NumberKind::Decimal,
            Number::Float(_) => NumberKind::Float,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.kind() != NumberKind::Float
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(i) => *i == IBig::ZERO,
            Number::Rational(r) => is_zero(r),
            Number::Decimal(d) => *d == DBig::ZERO,
            Number::Float(f) => *f == 0.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Integer(i) => *i < IBig::ZERO,
            Number::Rational(r) => *r.numerator() < IBig::ZERO,
            Number::Decimal(d) => *d < DBig::ZERO,
            Number::Float(f) => *f < 0.0,
        }
    }

    // ========== Exact bridge ==========

    /// The exact rational value, `None` for non-finite floats
    pub fn to_rational(&self) -> Option<RBig> {
        match self {
            Number::Integer(i) => Some(RBig::from(i.clone())),
            Number::Rational(r) => Some(r.clone()),
            Number::Decimal(d) => Some(decimal_to_rational(d)),
            Number::Float(f) => {
                if f.is_finite() {
                    parse_rational(&format!("{:e}", f)).ok()
                } else {
                    None
                }
            }
        }
    }

    // ========== Basic Arithmetic ==========

    /// Apply an exact operation, widening to the larger kind of the operands.
    fn combine(
        &self,
        other: &Self,
        exact: impl Fn(RBig, RBig) -> Result<RBig, NumberError>,
        float: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, NumberError> {
        let kind = self.kind().max(other.kind());
        if kind == NumberKind::Float {
            let (a, b) = (self.float_value()?, other.float_value()?);
            return Ok(Number::Float(float(a, b)));
        }
        let (a, b) = (self.exact_value()?, other.exact_value()?);
        Ok(Self::from_exact(exact(a, b)?, kind))
    }

    pub fn add(&self, other: &Self) -> Self {
        self.combine(other, |a, b| Ok(a + b), |a, b| a + b)
            .unwrap_or(Number::Float(f64::NAN))
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.combine(other, |a, b| Ok(a - b), |a, b| a - b)
            .unwrap_or(Number::Float(f64::NAN))
    }

    pub fn mul(&self, other: &Self) -> Self {
        self.combine(other, |a, b| Ok(a * b), |a, b| a * b)
            .unwrap_or(Number::Float(f64::NAN))
    }

    /// Safe division (returns Result, never panics)
    pub fn checked_div(&self, other: &Self) -> Result<Self, NumberError> {
        if other.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        self.combine(other, |a, b| Ok(a / b), |a, b| a / b)
    }

    /// Integer power (exact for exact kinds)
    pub fn pow(&self, exp: i32) -> Result<Self, NumberError> {
        if exp == 0 {
            return Ok(Self::from_exact(RBig::ONE, self.kind()));
        }

        let mut result = Self::from_exact(RBig::ONE, self.kind());
        for _ in 0..exp.unsigned_abs() {
            result = result.mul(self);
        }

        if exp < 0 {
            Self::from_exact(RBig::ONE, self.kind()).checked_div(&result)
        } else {
            Ok(result)
        }
    }

    /// `value * factor + offset`
    pub fn affine(&self, factor: &RBig, offset: &RBig) -> Self {
        match self {
            Number::Float(f) => {
                let factor = rational_to_f64(factor).unwrap_or(f64::NAN);
                let offset = rational_to_f64(offset).unwrap_or(f64::NAN);
                Number::Float(f * factor + offset)
            }
            _ => match self.to_rational() {
                Some(r) => Self::from_exact(r * factor + offset, self.kind()),
                None => Number::Float(f64::NAN),
            },
        }
    }

    /// `(value - offset) / factor`
    pub fn checked_unaffine(&self, factor: &RBig, offset: &RBig) -> Result<Self, NumberError> {
        if is_zero(factor) {
            return Err(NumberError::DivisionByZero);
        }
        match self {
            Number::Float(f) => {
                let factor = rational_to_f64(factor).unwrap_or(f64::NAN);
                let offset = rational_to_f64(offset).unwrap_or(f64::NAN);
                Ok(Number::Float((f - offset) / factor))
            }
            _ => {
                let r = self.exact_value()?;
                Ok(Self::from_exact((r - offset) / factor, self.kind()))
            }
        }
    }

    /// `1 / value`
    pub fn checked_recip(&self) -> Result<Self, NumberError> {
        Self::from_exact(RBig::ONE, self.kind()).checked_div(self)
    }

    // ========== Transcendental Functions ==========

    /// Square root, computed at the working precision
    pub fn sqrt(&self) -> Result<Self, NumberError> {
        if self.is_negative() {
            return Err(NumberError::DomainError(
                "square root of negative number".to_string()
            ));
        }
        if self.is_zero() {
            return Ok(Self::from_exact(RBig::ZERO, self.kind()));
        }
        match self {
            Number::Float(f) => Ok(Number::Float(f.sqrt())),
            _ => Ok(Number::Decimal(self.decimal_value()?.sqrt())),
        }
    }

    /// Natural logarithm
    pub fn ln(&self) -> Result<Self, NumberError> {
        if self.is_negative() || self.is_zero() {
            return Err(NumberError::DomainError(
                "logarithm of non-positive number".to_string()
            ));
        }
        match self {
            Number::Float(f) => Ok(Number::Float(f.ln())),
            _ => Ok(Number::Decimal(self.decimal_value()?.ln())),
        }
    }

    /// Exponential function (e^x)
    pub fn exp(&self) -> Result<Self, NumberError> {
        match self {
            Number::Float(f) => Ok(Number::Float(f.exp())),
            _ => Ok(Number::Decimal(self.decimal_value()?.exp())),
        }
    }

    // ========== Conversion ==========

    fn exact_value(&self) -> Result<RBig, NumberError> {
        self.to_rational()
            .ok_or_else(|| NumberError::DomainError(format!("{} is not finite", self)))
    }

    fn float_value(&self) -> Result<f64, NumberError> {
        self.to_f64()
            .ok_or_else(|| NumberError::DomainError(format!("{} does not fit in f64", self)))
    }

    fn decimal_value(&self) -> Result<DBig, NumberError> {
        match self {
            Number::Decimal(d) => Ok(with_work_precision(d.clone())),
            _ => Ok(rational_to_decimal(&self.exact_value()?)),
        }
    }

    /// Try to convert to i64
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => i.clone().try_into().ok(),
            Number::Float(f) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => Some(*f as i64),
            Number::Float(_) => None,
            _ => {
                let r = self.to_rational()?;
                if is_integral(&r) {
                    r.numerator().clone().try_into().ok()
                } else {
                    None
                }
            }
        }
    }

    /// Integer part, truncated toward zero
    pub fn trunc(&self) -> Self {
        match self {
            Number::Integer(_) => self.clone(),
            Number::Float(f) => Number::Float(f.trunc()),
            _ => match self.to_rational() {
                Some(r) => Number::Integer(r.numerator() / IBig::from(r.denominator().clone())),
                None => Number::Float(f64::NAN),
            },
        }
    }

    /// Convert to f64 (may lose precision)
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Number::Float(f) => Some(*f),
            Number::Decimal(d) => decimal_to_f64(d),
            _ => rational_to_f64(&self.to_rational()?),
        }
    }

    // ========== Display ==========

    /// Render as decimal string with the given number of places.
    ///
    /// Exact kinds round half away from zero on the exact value.
    pub fn as_decimal(&self, places: u32) -> String {
        match self {
            Number::Float(f) => format!("{:.prec$}", f, prec = places as usize),
            _ => match self.to_rational() {
                Some(r) => round_to_places(&r, places),
                None => "NaN".to_string(),
            },
        }
    }
}

// ========== Rational helpers ==========

fn with_work_precision(val: DBig) -> DBig {
    val.with_precision(DEFAULT_PRECISION).value()
}

fn is_zero(r: &RBig) -> bool {
    *r.numerator() == IBig::ZERO
}

fn is_integral(r: &RBig) -> bool {
    *r.denominator() == UBig::ONE
}

fn pow10(exp: usize) -> IBig {
    IBig::from(10u8).pow(exp)
}

/// `r * 10^exp` for a signed exponent
fn scale_pow10(r: RBig, exp: i64) -> RBig {
    let scale = RBig::from(pow10(exp.unsigned_abs() as usize));
    if exp >= 0 {
        r * scale
    } else {
        r / scale
    }
}

/// Parse an exact rational from "a/b", "1.25", "-3", "1e-9" or "6.02214076E23"
pub fn parse_rational(s: &str) -> Result<RBig, NumberError> {
    let s = s.trim();
    let err = || NumberError::ParseError(s.to_string());

    if let Some((num, den)) = s.split_once('/') {
        let num = parse_rational(num)?;
        let den = parse_rational(den)?;
        if is_zero(&den) {
            return Err(NumberError::DivisionByZero);
        }
        return Ok(num / den);
    }

    let (mantissa, exponent) = match s.find(|c| c == 'e' || c == 'E') {
        Some(pos) => {
            let exp: i64 = s[pos + 1..].parse().map_err(|_| err())?;
            if exp.unsigned_abs() > u64::from(MAX_EXPONENT) {
                return Err(NumberError::ParseError(format!("{} (exponent out of range)", s)));
            }
            (&s[..pos], exp)
        }
        None => (s, 0),
    };

    let (negative, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(err());
    }

    let mut numerator: IBig = format!("{}{}", int_part, frac_part).parse().map_err(|_| err())?;
    if negative {
        numerator = -numerator;
    }

    Ok(scale_pow10(RBig::from(numerator), exponent - frac_part.len() as i64))
}

fn decimal_to_rational(d: &DBig) -> RBig {
    let (significand, exponent) = d.clone().into_repr().into_parts();
    scale_pow10(RBig::from(significand), exponent as i64)
}

fn rational_to_decimal(r: &RBig) -> DBig {
    let num = with_work_precision(DBig::from_parts(r.numerator().clone(), 0));
    let den = with_work_precision(DBig::from_parts(IBig::from(r.denominator().clone()), 0));
    num / den
}

fn rational_to_f64(r: &RBig) -> Option<f64> {
    decimal_to_f64(&rational_to_decimal(r))
}

fn decimal_to_f64(d: &DBig) -> Option<f64> {
    // DBig stores significand * 10^exponent; the std parser rounds correctly
    let (significand, exponent) = d.clone().into_repr().into_parts();
    let result: f64 = format!("{}e{}", significand, exponent).parse().ok()?;

    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}

fn round_to_places(r: &RBig, places: u32) -> String {
    let scaled = r * &RBig::from(pow10(places as usize));
    let numerator = scaled.numerator().clone();
    let denominator = IBig::from(scaled.denominator().clone());

    let negative = numerator < IBig::ZERO;
    let magnitude = if negative { -numerator } else { numerator };
    let two = IBig::from(2);
    let rounded = (&magnitude * &two + &denominator) / (&denominator * &two);

    let digits = rounded.to_string();
    let places = places as usize;
    let body = if places == 0 {
        digits
    } else {
        let padded = format!("{:0>width$}", digits, width = places + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - places);
        format!("{}.{}", int_part, frac_part)
    };

    if negative && rounded != IBig::ZERO {
        format!("-{}", body)
    } else {
        body
    }
}

// ========== Trait Implementations ==========

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Rational(r) => write!(f, "{}/{}", r.numerator(), r.denominator()),
            Number::Decimal(d) => write!(f, "{}", d),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct NumberRepr {
    kind: NumberKind,
    value: String,
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = match self {
            Number::Float(x) => format!("{:e}", x),
            other => other.to_string(),
        };
        NumberRepr { kind: self.kind(), value }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = NumberRepr::deserialize(deserializer)?;
        match repr.kind {
            NumberKind::Float => repr.value.parse::<f64>()
                .map(Number::Float)
                .map_err(serde::de::Error::custom),
            kind => parse_rational(&repr.value)
                .map(|r| match kind {
                    NumberKind::Decimal => Number::Decimal(rational_to_decimal(&r)),
                    NumberKind::Rational => Number::Rational(r),
                    _ => Number::from_exact(r, kind),
                })
                .map_err(serde::de::Error::custom),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_exact() && other.is_exact() {
            return Some(self.to_rational()?.cmp(&other.to_rational()?));
        }
        self.to_f64()?.partial_cmp(&other.to_f64()?)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::from_i64(n)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}

impl From<RBig> for Number {
    fn from(r: RBig) -> Self {
        Number::Rational(r)
    }
}

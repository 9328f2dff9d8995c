//! Mensura Core - Fundamental types
//!
//! This crate provides the core types used throughout Mensura:
//! - `Number`: integer, exact rational, decimal or float measurement values
//! - `MensuraError`: structured errors with stable codes

mod number;
mod error;

pub use number::{Number, NumberKind, NumberError, parse_rational, DEFAULT_PRECISION, MAX_EXPONENT};
pub use error::{MensuraError, codes};

pub use dashu_int::{IBig, UBig};
pub use dashu_ratio::RBig;

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, MensuraError>;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Number, NumberKind, MensuraError, RBig};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod number_tests {
        use super::*;

        #[test]
        fn test_from_i64() {
            let n = Number::from_i64(42);
            assert_eq!(n.to_i64(), Some(42));
            assert_eq!(n.kind(), NumberKind::Integer);
        }

        #[test]
        fn test_from_str_kinds() {
            assert_eq!(Number::from_str("123").unwrap().kind(), NumberKind::Integer);
            assert_eq!(Number::from_str("-7").unwrap().to_i64(), Some(-7));
            assert_eq!(Number::from_str("1/3").unwrap().kind(), NumberKind::Rational);
            assert_eq!(Number::from_str("3.14").unwrap().kind(), NumberKind::Decimal);
            assert_eq!(Number::from_str("1.5e3").unwrap().to_i64(), Some(1500));
            assert!(Number::from_str("abc").is_err());
            assert!(Number::from_str("1/0").is_err());
        }

        #[test]
        fn test_parse_rational() {
            let r = parse_rational("1.25").unwrap();
            assert_eq!(r, RBig::from(IBig::from(5)) / RBig::from(IBig::from(4)));

            let r = parse_rational("-2.5E3").unwrap();
            assert_eq!(r, RBig::from(IBig::from(-2500)));

            let r = parse_rational("1e-9").unwrap();
            assert_eq!(r, RBig::ONE / RBig::from(IBig::from(1_000_000_000)));

            let r = parse_rational("45967/180").unwrap();
            assert_eq!(r.numerator(), &IBig::from(45967));

            assert!(parse_rational("").is_err());
            assert!(parse_rational("1.2.3").is_err());
            assert!(parse_rational("e5").is_err());
        }

        #[test]
        fn test_exponent_out_of_range() {
            assert!(matches!(parse_rational("1e4294967296"), Err(NumberError::ParseError(_))));
            assert!(matches!(parse_rational("1e-99999999999"), Err(NumberError::ParseError(_))));
            assert!(Number::from_str("1e999999999").is_err());

            let r = parse_rational("1e1000").unwrap();
            assert_eq!(r.numerator().to_string().len(), 1001);
            assert_eq!(parse_rational("1e300").unwrap(), parse_rational("1e299").unwrap() * RBig::from(IBig::from(10)));
        }

        #[test]
        fn test_integer_stays_integer_when_integral() {
            let a = Number::from_i64(6);
            let b = Number::from_i64(3);
            let q = a.checked_div(&b).unwrap();
            assert_eq!(q.kind(), NumberKind::Integer);
            assert_eq!(q.to_i64(), Some(2));

            let q = b.checked_div(&a).unwrap();
            assert_eq!(q.kind(), NumberKind::Rational);
            assert_eq!(q.to_string(), "1/2");
        }

        #[test]
        fn test_widening() {
            let i = Number::from_i64(1);
            let r = Number::from_ratio(1, 3).unwrap();
            let d = Number::from_str("0.5").unwrap();
            let f = Number::from_f64(0.25);

            assert_eq!(i.add(&r).kind(), NumberKind::Rational);
            assert_eq!(r.add(&d).kind(), NumberKind::Decimal);
            assert_eq!(d.mul(&f).kind(), NumberKind::Float);
        }

        #[test]
        fn test_division_by_zero() {
            let a = Number::from_i64(1);
            assert_eq!(a.checked_div(&Number::from_i64(0)), Err(NumberError::DivisionByZero));
            assert!(Number::from_i64(0).checked_recip().is_err());
            assert!(Number::from_ratio(1, 0).is_err());
        }

        #[test]
        fn test_pow() {
            let two = Number::from_i64(2);
            assert_eq!(two.pow(10).unwrap().to_i64(), Some(1024));
            assert_eq!(two.pow(-2).unwrap(), Number::from_ratio(1, 4).unwrap());
            assert_eq!(two.pow(0).unwrap().to_i64(), Some(1));
        }

        #[test]
        fn test_affine_exact() {
            // celsius -> kelvin
            let factor = RBig::ONE;
            let offset = parse_rational("273.15").unwrap();
            let k = Number::from_i64(100).affine(&factor, &offset);
            assert_eq!(k.kind(), NumberKind::Rational);
            assert_eq!(k.as_decimal(2), "373.15");

            let back = k.checked_unaffine(&factor, &offset).unwrap();
            assert_eq!(back, Number::from_i64(100));
            assert_eq!(back.kind(), NumberKind::Integer);
        }

        #[test]
        fn test_float_affine() {
            let v = Number::from_f64(1.5).affine(&RBig::from(IBig::from(2)), &RBig::ONE);
            assert_eq!(v.to_f64(), Some(4.0));
        }

        #[test]
        fn test_as_decimal_rounding() {
            let r = Number::from_ratio(2, 3).unwrap();
            assert_eq!(r.as_decimal(3), "0.667");
            let r = Number::from_ratio(-1, 8).unwrap();
            assert_eq!(r.as_decimal(2), "-0.13");
            let r = Number::from_ratio(-1, 1000).unwrap();
            assert_eq!(r.as_decimal(2), "0.00");
            assert_eq!(Number::from_i64(7).as_decimal(0), "7");
            assert_eq!(Number::from_i64(7).as_decimal(2), "7.00");
        }

        #[test]
        fn test_exact_equality() {
            let half = Number::from_ratio(1, 2).unwrap();
            let dec = Number::from_str("0.5").unwrap();
            assert_eq!(half, dec);
            assert!(Number::from_i64(1) > half);
        }

        #[test]
        fn test_to_f64() {
            let n = Number::from_ratio(1, 4).unwrap();
            assert_eq!(n.to_f64(), Some(0.25));
            let n = Number::from_str("602214076e15").unwrap();
            let f = n.to_f64().unwrap();
            assert!((f / 6.02214076e23 - 1.0).abs() < 1e-12);
        }

        #[test]
        fn test_trunc() {
            let n = Number::from_str("5.9").unwrap().trunc();
            assert_eq!(n.kind(), NumberKind::Integer);
            assert_eq!(n, Number::from_i64(5));
            assert_eq!(Number::from_ratio(-7, 2).unwrap().trunc(), Number::from_i64(-3));
            assert_eq!(Number::from_f64(2.75).trunc(), Number::from_f64(2.0));
        }

        #[test]
        fn test_float_to_rational() {
            let r = Number::from_f64(0.1).to_rational().unwrap();
            assert_eq!(r, parse_rational("0.1").unwrap());
            assert!(Number::from_f64(f64::NAN).to_rational().is_none());
        }

        #[test]
        fn test_transcendentals() {
            let four = Number::from_i64(4);
            let root = four.sqrt().unwrap();
            assert!((root.to_f64().unwrap() - 2.0).abs() < 1e-12);
            assert!(Number::from_i64(-1).sqrt().is_err());
            assert!(Number::from_i64(0).ln().is_err());

            let e = Number::from_i64(1).exp().unwrap();
            assert!((e.to_f64().unwrap() - std::f64::consts::E).abs() < 1e-12);
        }

        #[test]
        fn test_serde_roundtrip() {
            let n = Number::from_ratio(2, 3).unwrap();
            let json = serde_json::to_string(&n).unwrap();
            assert_eq!(json, r#"{"kind":"rational","value":"2/3"}"#);
            let back: Number = serde_json::from_str(&json).unwrap();
            assert_eq!(back.kind(), NumberKind::Rational);
            assert_eq!(back, n);
        }
    }
}

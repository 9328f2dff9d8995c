//! Unit values - a number paired with a canonical compound unit

use std::fmt;
use serde::{Serialize, Deserialize};
use mensura_core::{Number, Result};
use crate::{canonicalize, CompoundUnit};

/// A value measured in some unit, e.g. `30 mile_per_gallon`.
///
/// Never mutated: arithmetic returns new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub name: CompoundUnit,
    pub value: Number,
}

impl Unit {
    /// Create a value, canonicalizing the unit name
    pub fn new(value: impl Into<Number>, name: &str) -> Result<Self> {
        Ok(Unit { name: canonicalize(name)?, value: value.into() })
    }

    pub fn from_compound(value: Number, name: CompoundUnit) -> Self {
        Unit { name, value }
    }

    /// Multiply values and units (`1 meter × 1 meter = 1 square_meter`)
    pub fn mult(&self, other: &Unit) -> Unit {
        Unit {
            name: self.name.mul(&other.name),
            value: self.value.mul(&other.value),
        }
    }

    pub fn div(&self, other: &Unit) -> Result<Unit> {
        Ok(Unit {
            name: self.name.div(&other.name),
            value: self.value.checked_div(&other.value)?,
        })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_one() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mensura_core::codes;

    fn meters(v: i64) -> Unit {
        Unit::new(Number::from_i64(v), "meter").unwrap()
    }

    #[test]
    fn test_unit_creation() {
        let u = Unit::new(5i64, "Kilometer-Per-Hour").unwrap();
        assert_eq!(u.value, Number::from_i64(5));
        assert_eq!(u.name.to_string(), "kilometer_per_hour");

        let err = Unit::new(1i64, "fortnight").unwrap_err();
        assert_eq!(err.code(), codes::UNKNOWN_UNIT);
    }

    #[test]
    fn test_mult_composes_powers() {
        let area = meters(1).mult(&meters(1));
        assert_eq!(area.name.to_string(), "square_meter");
        assert_eq!(area.value, Number::from_i64(1));

        let volume = area.mult(&meters(2));
        assert_eq!(volume.name.to_string(), "cubic_meter");
        assert_eq!(volume.value, Number::from_i64(2));

        let fourth = area.mult(&area);
        assert_eq!(fourth.name.to_string(), "pow4_meter");
    }

    #[test]
    fn test_div() {
        let speed = meters(100).div(&Unit::new(10i64, "second").unwrap()).unwrap();
        assert_eq!(speed.name.to_string(), "meter_per_second");
        assert_eq!(speed.value, Number::from_i64(10));

        let ratio = meters(3).div(&meters(4)).unwrap();
        assert!(ratio.name.is_one());
        assert_eq!(ratio.value, Number::from_ratio(3, 4).unwrap());

        let err = meters(1).div(&meters(0)).unwrap_err();
        assert_eq!(err.code(), codes::NUMBER_ERROR);
    }

    #[test]
    fn test_display() {
        assert_eq!(meters(5).to_string(), "5 meter");
        assert_eq!(meters(3).div(&meters(4)).unwrap().to_string(), "3/4");
    }

    #[test]
    fn test_serde() {
        let u = Unit::new(30i64, "mile_per_gallon").unwrap();
        let json = serde_json::to_value(&u).unwrap();
        assert_eq!(json["name"], "mile_per_gallon");
        let back: Unit = serde_json::from_value(json).unwrap();
        assert_eq!(back, u);
    }
}

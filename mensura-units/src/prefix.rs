//! SI prefixes

use std::fmt;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiPrefix {
    Quecto,
    Ronto,
    Yocto,
    Zepto,
    Atto,
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    Centi,
    Deci,
    Deka,
    Hecto,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
    Yotta,
    Ronna,
    Quetta,
}

impl SiPrefix {
    pub const ALL: [SiPrefix; 24] = [
        SiPrefix::Quecto,
        SiPrefix::Ronto,
        SiPrefix::Yocto,
        SiPrefix::Zepto,
        SiPrefix::Atto,
        SiPrefix::Femto,
        SiPrefix::Pico,
        SiPrefix::Nano,
        SiPrefix::Micro,
        SiPrefix::Milli,
        SiPrefix::Centi,
        SiPrefix::Deci,
        SiPrefix::Deka,
        SiPrefix::Hecto,
        SiPrefix::Kilo,
        SiPrefix::Mega,
        SiPrefix::Giga,
        SiPrefix::Tera,
        SiPrefix::Peta,
        SiPrefix::Exa,
        SiPrefix::Zetta,
        SiPrefix::Yotta,
        SiPrefix::Ronna,
        SiPrefix::Quetta,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SiPrefix::Quecto => "quecto",
            SiPrefix::Ronto => "ronto",
            SiPrefix::Yocto => "yocto",
            SiPrefix::Zepto => "zepto",
            SiPrefix::Atto => "atto",
            SiPrefix::Femto => "femto",
            SiPrefix::Pico => "pico",
            SiPrefix::Nano => "nano",
            SiPrefix::Micro => "micro",
            SiPrefix::Milli => "milli",
            SiPrefix::Centi => "centi",
            SiPrefix::Deci => "deci",
            SiPrefix::Deka => "deka",
            SiPrefix::Hecto => "hecto",
            SiPrefix::Kilo => "kilo",
            SiPrefix::Mega => "mega",
            SiPrefix::Giga => "giga",
            SiPrefix::Tera => "tera",
            SiPrefix::Peta => "peta",
            SiPrefix::Exa => "exa",
            SiPrefix::Zetta => "zetta",
            SiPrefix::Yotta => "yotta",
            SiPrefix::Ronna => "ronna",
            SiPrefix::Quetta => "quetta",
        }
    }

    /// Power of ten the prefix stands for
    pub fn power(self) -> i32 {
        match self {
            SiPrefix::Quecto => -30,
            SiPrefix::Ronto => -27,
            SiPrefix::Yocto => -24,
            SiPrefix::Zepto => -21,
            SiPrefix::Atto => -18,
            SiPrefix::Femto => -15,
            SiPrefix::Pico => -12,
            SiPrefix::Nano => -9,
            SiPrefix::Micro => -6,
            SiPrefix::Milli => -3,
            SiPrefix::Centi => -2,
            SiPrefix::Deci => -1,
            SiPrefix::Deka => 1,
            SiPrefix::Hecto => 2,
            SiPrefix::Kilo => 3,
            SiPrefix::Mega => 6,
            SiPrefix::Giga => 9,
            SiPrefix::Tera => 12,
            SiPrefix::Peta => 15,
            SiPrefix::Exa => 18,
            SiPrefix::Zetta => 21,
            SiPrefix::Yotta => 24,
            SiPrefix::Ronna => 27,
            SiPrefix::Quetta => 30,
        }
    }

    /// Split `word` into a prefix and the remainder (`kilometer` -> kilo, `meter`)
    pub fn strip(word: &str) -> Option<(SiPrefix, &str)> {
        SiPrefix::ALL.iter().find_map(|p| {
            word.strip_prefix(p.name())
                .filter(|rest| !rest.is_empty())
                .map(|rest| (*p, rest))
        })
    }
}

impl fmt::Display for SiPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip() {
        assert_eq!(SiPrefix::strip("kilometer"), Some((SiPrefix::Kilo, "meter")));
        assert_eq!(SiPrefix::strip("millimeter_ofhg"), Some((SiPrefix::Milli, "meter_ofhg")));
        assert_eq!(SiPrefix::strip("dekaliter"), Some((SiPrefix::Deka, "liter")));
        assert_eq!(SiPrefix::strip("meter"), None);
        assert_eq!(SiPrefix::strip("kilo"), None);
    }

    #[test]
    fn test_powers_ascending() {
        let powers: Vec<i32> = SiPrefix::ALL.iter().map(|p| p.power()).collect();
        assert!(powers.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(SiPrefix::Quetta.power(), 30);
    }
}

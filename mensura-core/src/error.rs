//! Structured engine errors
//!
//! Every failure carries a stable machine-readable code and, where one
//! exists, a suggestion for fixing the request.

use crate::NumberError;
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const AMBIGUOUS_UNIT: &str = "AMBIGUOUS_UNIT";
    pub const INCOMPATIBLE_UNITS: &str = "INCOMPATIBLE_UNITS";
    pub const UNKNOWN_USAGE: &str = "UNKNOWN_USAGE";
    pub const UNKNOWN_CATEGORY: &str = "UNKNOWN_CATEGORY";
    pub const UNCONVERTIBLE_UNIT: &str = "UNCONVERTIBLE_UNIT";
    pub const INVALID_UNIT_NAME: &str = "INVALID_UNIT_NAME";
    pub const LOCALE_ERROR: &str = "LOCALE_ERROR";
    pub const NUMBER_ERROR: &str = "NUMBER_ERROR";
    pub const DATA_ERROR: &str = "DATA_ERROR";
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MensuraError {
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Ambiguous unit '{token}': matches {}", candidates.join(", "))]
    AmbiguousUnit {
        token: String,
        candidates: Vec<String>,
    },

    #[error("Cannot convert {from} ({from_category}) to {to} ({to_category})")]
    IncompatibleUnits {
        from: String,
        to: String,
        from_category: String,
        to_category: String,
    },

    #[error("Unknown usage {} for category {category}", usage.as_deref().unwrap_or("<none>"))]
    UnknownUsage {
        category: String,
        usage: Option<String>,
        known: Vec<String>,
    },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unit has no conversion: {0}")]
    Unconvertible(String),

    #[error("Invalid unit name '{name}': {reason}")]
    InvalidUnitName {
        name: String,
        reason: String,
    },

    #[error("Invalid locale '{tag}': {reason}")]
    Locale {
        tag: String,
        reason: String,
    },

    #[error(transparent)]
    Number(#[from] NumberError),

    #[error("Invalid data: {0}")]
    Data(String),
}

impl MensuraError {
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        MensuraError::InvalidUnitName { name: name.into(), reason: reason.into() }
    }

    pub fn locale(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        MensuraError::Locale { tag: tag.into(), reason: reason.into() }
    }

    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            MensuraError::UnknownUnit(_) => codes::UNKNOWN_UNIT,
            MensuraError::AmbiguousUnit { .. } => codes::AMBIGUOUS_UNIT,
            MensuraError::IncompatibleUnits { .. } => codes::INCOMPATIBLE_UNITS,
            MensuraError::UnknownUsage { .. } => codes::UNKNOWN_USAGE,
            MensuraError::UnknownCategory(_) => codes::UNKNOWN_CATEGORY,
            MensuraError::Unconvertible(_) => codes::UNCONVERTIBLE_UNIT,
            MensuraError::InvalidUnitName { .. } => codes::INVALID_UNIT_NAME,
            MensuraError::Locale { .. } => codes::LOCALE_ERROR,
            MensuraError::Number(_) => codes::NUMBER_ERROR,
            MensuraError::Data(_) => codes::DATA_ERROR,
        }
    }

    /// Suggestion for fixing the error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            MensuraError::UnknownUnit(name) => Some(format!(
                "Check the spelling of '{}'; names are lowercase and joined with '_'", name
            )),
            MensuraError::AmbiguousUnit { candidates, .. } => {
                Some(format!("Use one of: {}", candidates.join(", ")))
            }
            MensuraError::IncompatibleUnits { from_category, .. } => {
                Some(format!("Convert to another {} unit", from_category))
            }
            MensuraError::UnknownUsage { known, .. } if !known.is_empty() => {
                Some(format!("Known usages: {}", known.join(", ")))
            }
            MensuraError::InvalidUnitName { .. } => {
                Some("Powers are written square_, cubic_ or powN_ with N from 2 to 15".to_string())
            }
            MensuraError::Locale { .. } => {
                Some("Use a BCP-47 tag such as en-US or de-CH".to_string())
            }
            MensuraError::Number(NumberError::DivisionByZero) => {
                Some("Ensure divisor is not zero".to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(MensuraError::UnknownUnit("x".into()).code(), codes::UNKNOWN_UNIT);
        assert_eq!(MensuraError::Data("bad".into()).code(), codes::DATA_ERROR);
        let err: MensuraError = NumberError::DivisionByZero.into();
        assert_eq!(err.code(), codes::NUMBER_ERROR);
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_display() {
        let err = MensuraError::AmbiguousUnit {
            token: "mi".into(),
            candidates: vec!["mile".into(), "mile_scandinavian".into()],
        };
        assert_eq!(err.to_string(), "Ambiguous unit 'mi': matches mile, mile_scandinavian");

        let err = MensuraError::UnknownUsage {
            category: "length".into(),
            usage: None,
            known: vec!["default".into(), "road".into()],
        };
        assert_eq!(err.to_string(), "Unknown usage <none> for category length");
        assert_eq!(err.suggestion().as_deref(), Some("Known usages: default, road"));
    }
}

//! Base conversion table - directly authored conversions to category base units

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::debug;
use mensura_core::{MensuraError, Number, NumberError, RBig, Result, parse_rational};
use crate::{canonicalize, CompoundUnit};

/// Conversions shipped with the crate
const EMBEDDED_CONVERSIONS: &str = include_str!("../data/conversions.json");

/// A conversion that is not affine, given as a pair of functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialConversion {
    /// Beaufort force to meters per second: `v = 0.836 * B^(3/2)`
    Beaufort,
}

impl SpecialConversion {
    pub fn name(self) -> &'static str {
        match self {
            SpecialConversion::Beaufort => "beaufort",
        }
    }

    pub fn to_base(self, value: &Number) -> std::result::Result<Number, NumberError> {
        match self {
            SpecialConversion::Beaufort => {
                if value.is_negative() {
                    return Err(NumberError::DomainError("negative beaufort force".to_string()));
                }
                let coefficient = Number::from_ratio(836, 1000)?;
                Ok(value.mul(&value.sqrt()?).mul(&coefficient))
            }
        }
    }

    pub fn from_base(self, value: &Number) -> std::result::Result<Number, NumberError> {
        match self {
            SpecialConversion::Beaufort => {
                if value.is_negative() {
                    return Err(NumberError::DomainError("negative wind speed".to_string()));
                }
                if value.is_zero() {
                    return Ok(value.clone());
                }
                // B = (v / 0.836)^(2/3)
                let scaled = value.checked_div(&Number::from_ratio(836, 1000)?)?;
                let two_thirds = Number::from_ratio(2, 3)?;
                scaled.ln()?.mul(&two_thirds).exp()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionKind {
    /// `base = value * factor + offset`
    Affine { factor: RBig, offset: RBig },
    Special(SpecialConversion),
}

/// How to reach a base unit from some unit
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub base: CompoundUnit,
    pub kind: ConversionKind,
}

impl Conversion {
    pub fn affine(base: CompoundUnit, factor: RBig, offset: RBig) -> Self {
        Conversion { base, kind: ConversionKind::Affine { factor, offset } }
    }

    pub fn special(base: CompoundUnit, special: SpecialConversion) -> Self {
        Conversion { base, kind: ConversionKind::Special(special) }
    }

    /// A base unit converting to itself
    pub fn identity(base: CompoundUnit) -> Self {
        Conversion::affine(base, RBig::ONE, RBig::ZERO)
    }

    pub fn is_affine(&self) -> bool {
        matches!(self.kind, ConversionKind::Affine { .. })
    }

    /// The factor of an affine conversion without offset.
    ///
    /// Only these compose into powers, quotients and products.
    pub fn linear_factor(&self) -> Option<&RBig> {
        match &self.kind {
            ConversionKind::Affine { factor, offset } if *offset.numerator() == mensura_core::IBig::ZERO => {
                Some(factor)
            }
            _ => None,
        }
    }

    pub fn to_base(&self, value: &Number) -> Result<Number> {
        match &self.kind {
            ConversionKind::Affine { factor, offset } => Ok(value.affine(factor, offset)),
            ConversionKind::Special(special) => Ok(special.to_base(value)?),
        }
    }

    pub fn from_base(&self, value: &Number) -> Result<Number> {
        match &self.kind {
            ConversionKind::Affine { factor, offset } => Ok(value.checked_unaffine(factor, offset)?),
            ConversionKind::Special(special) => Ok(special.from_base(value)?),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    base: String,
    factor: Option<String>,
    offset: Option<String>,
    special: Option<SpecialConversion>,
}

/// Authored conversions keyed by canonical unit name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseTable {
    entries: BTreeMap<String, Conversion>,
}

impl BaseTable {
    /// Decode `{name: {base, factor?, offset?, special?}}`.
    ///
    /// Factors and offsets are exact: "0.3048", "5/9", "1.602176634e-19".
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawEntry> = serde_json::from_str(json)
            .map_err(|e| MensuraError::Data(format!("conversion table: {}", e)))?;

        let mut entries = BTreeMap::new();
        for (name, entry) in raw {
            let unit = canonicalize(&name)
                .map_err(|e| MensuraError::Data(format!("conversion '{}': {}", name, e)))?;
            let base = canonicalize(&entry.base)
                .map_err(|e| MensuraError::Data(format!("base of '{}': {}", name, e)))?;

            let conversion = match (entry.special, entry.factor, entry.offset) {
                (Some(special), None, None) => Conversion::special(base, special),
                (Some(_), _, _) => {
                    return Err(MensuraError::Data(format!(
                        "conversion '{}' mixes a special conversion with a factor", name
                    )));
                }
                (None, factor, offset) => {
                    let factor = exact(&name, factor.as_deref().unwrap_or("1"))?;
                    if *factor.numerator() == mensura_core::IBig::ZERO {
                        return Err(MensuraError::Data(format!("conversion '{}' has a zero factor", name)));
                    }
                    let offset = exact(&name, offset.as_deref().unwrap_or("0"))?;
                    Conversion::affine(base, factor, offset)
                }
            };
            entries.insert(unit.to_string(), conversion);
        }

        debug!(entries = entries.len(), "loaded base conversion table");
        Ok(BaseTable { entries })
    }

    /// The shipped conversion data
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CONVERSIONS)
    }

    pub fn get(&self, name: &str) -> Option<&Conversion> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Conversion)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn exact(name: &str, text: &str) -> Result<RBig> {
    parse_rational(text).map_err(|e| MensuraError::Data(format!("conversion '{}': {}", name, e)))
}

//! Compound units - ratios of products of integer powers of atoms

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use serde::{Serialize, Deserialize, Serializer, Deserializer};
use mensura_core::UBig;
use crate::{Category, SiPrefix};
use crate::registry::{UnitId, REGISTRY};

/// Base unit of every category, parsed once
static CATEGORY_BASES: LazyLock<HashMap<Category, CompoundUnit>> = LazyLock::new(|| {
    Category::ALL.iter()
        .filter_map(|c| crate::parse::canonicalize(c.base_unit()).ok().map(|u| (*c, u)))
        .collect()
});

/// Parsed base unit of a category
pub fn category_base(category: Category) -> Option<&'static CompoundUnit> {
    CATEGORY_BASES.get(&category)
}

/// The unit a factor is built on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    /// A registered atom
    Known(UnitId),
    /// A numeric literal such as the `100` of `liter_per_100_kilometer`
    Numeric(UBig),
    /// An ISO currency code from `curr_xxx`
    Currency(String),
}

impl Atom {
    pub fn category(&self) -> Option<Category> {
        match self {
            Atom::Known(id) => Some(REGISTRY.atom(*id).category),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Factor {
    pub prefix: Option<SiPrefix>,
    pub atom: Atom,
    pub exponent: i32,
}

impl Factor {
    pub fn new(prefix: Option<SiPrefix>, atom: Atom, exponent: i32) -> Self {
        Factor { prefix, atom, exponent }
    }

    fn same_unit(&self, other: &Factor) -> bool {
        self.prefix == other.prefix && self.atom == other.atom
    }

    /// Numeric literals first, then registered atoms by category and prefix
    /// magnitude, then atoms without a category.
    fn sort_key(&self) -> (u8, usize, Reverse<i32>) {
        let magnitude = Reverse(self.prefix.map_or(0, |p| p.power()));
        match &self.atom {
            Atom::Numeric(_) => (0, 0, magnitude),
            Atom::Known(id) => (1, REGISTRY.atom(*id).category.index(), magnitude),
            Atom::Currency(_) => (2, 0, magnitude),
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exponent {
            1 => {}
            2 => write!(f, "square_")?,
            3 => write!(f, "cubic_")?,
            n => write!(f, "pow{}_", n)?,
        }
        if let Some(prefix) = self.prefix {
            write!(f, "{}", prefix)?;
        }
        match &self.atom {
            Atom::Known(id) => write!(f, "{}", REGISTRY.atom(*id).name),
            Atom::Numeric(n) => write!(f, "{}", n),
            Atom::Currency(code) => write!(f, "curr_{}", code.to_lowercase()),
        }
    }
}

/// A canonical compound unit.
///
/// Both groups are collapsed (one entry per prefixed atom) and sorted; the
/// empty compound is the dimensionless one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CompoundUnit {
    numerator: Vec<Factor>,
    denominator: Vec<Factor>,
}

impl CompoundUnit {
    pub fn new(numerator: Vec<Factor>, denominator: Vec<Factor>) -> Self {
        CompoundUnit {
            numerator: normalize(numerator),
            denominator: normalize(denominator),
        }
    }

    pub fn one() -> Self {
        CompoundUnit::default()
    }

    pub fn is_one(&self) -> bool {
        self.numerator.is_empty() && self.denominator.is_empty()
    }

    pub fn numerator(&self) -> &[Factor] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[Factor] {
        &self.denominator
    }

    pub fn has_per(&self) -> bool {
        !self.denominator.is_empty()
    }

    pub fn factors(&self) -> impl Iterator<Item = &Factor> {
        self.numerator.iter().chain(self.denominator.iter())
    }

    /// The only factor, if there is exactly one and it is in the numerator
    pub fn single(&self) -> Option<&Factor> {
        match (self.numerator.as_slice(), self.denominator.is_empty()) {
            ([factor], true) => Some(factor),
            _ => None,
        }
    }

    /// The numerator alone, as a compound
    pub fn numerator_unit(&self) -> CompoundUnit {
        CompoundUnit { numerator: self.numerator.clone(), denominator: vec![] }
    }

    /// The denominator, as a compound of its own
    pub fn denominator_unit(&self) -> CompoundUnit {
        CompoundUnit { numerator: self.denominator.clone(), denominator: vec![] }
    }

    /// Concatenate groups without cancelling across them
    pub fn product(&self, other: &CompoundUnit) -> CompoundUnit {
        let numerator = self.numerator.iter().chain(&other.numerator).cloned().collect();
        let denominator = self.denominator.iter().chain(&other.denominator).cloned().collect();
        CompoundUnit::new(numerator, denominator)
    }

    /// Multiply, cancelling identical factors across the groups
    pub fn mul(&self, other: &CompoundUnit) -> CompoundUnit {
        let mut result = self.product(other);
        result.cancel();
        result
    }

    pub fn div(&self, other: &CompoundUnit) -> CompoundUnit {
        self.mul(&other.inverse())
    }

    pub fn inverse(&self) -> CompoundUnit {
        CompoundUnit {
            numerator: self.denominator.clone(),
            denominator: self.numerator.clone(),
        }
    }

    /// Raise to an integer power
    pub fn pow(&self, exp: i32) -> CompoundUnit {
        if exp == 0 {
            return CompoundUnit::one();
        }
        let source = if exp < 0 { self.inverse() } else { self.clone() };
        let scale = |group: &[Factor]| -> Vec<Factor> {
            group.iter()
                .map(|f| Factor::new(f.prefix, f.atom.clone(), f.exponent.saturating_mul(exp.saturating_abs())))
                .collect()
        };
        CompoundUnit {
            numerator: scale(&source.numerator),
            denominator: scale(&source.denominator),
        }
    }

    /// Reduce to the base atoms of each factor's category, cancelling.
    ///
    /// Two units of a category share a signature even when their derived
    /// bases are written differently (`kilowatt_hour` against `joule`).
    /// Numeric literals carry no dimension and drop out.
    pub fn signature(&self) -> CompoundUnit {
        let reduce = |group: &[Factor]| -> CompoundUnit {
            group.iter().fold(CompoundUnit::one(), |acc, factor| {
                let reduced = match &factor.atom {
                    Atom::Numeric(_) => CompoundUnit::one(),
                    Atom::Known(id) => match CATEGORY_BASES.get(&REGISTRY.atom(*id).category) {
                        Some(base) => base.pow(factor.exponent),
                        None => CompoundUnit::new(vec![factor.clone()], vec![]),
                    },
                    Atom::Currency(_) => {
                        CompoundUnit::new(vec![Factor::new(None, factor.atom.clone(), factor.exponent)], vec![])
                    }
                };
                acc.mul(&reduced)
            })
        };
        reduce(&self.numerator).div(&reduce(&self.denominator))
    }

    fn cancel(&mut self) {
        for factor in self.numerator.iter_mut() {
            if let Some(other) = self.denominator.iter_mut().find(|d| d.same_unit(factor)) {
                let common = factor.exponent.min(other.exponent);
                factor.exponent -= common;
                other.exponent -= common;
            }
        }
        self.numerator.retain(|f| f.exponent != 0);
        self.denominator.retain(|f| f.exponent != 0);
    }
}

/// Collapse repeated prefixed atoms, then sort by the canonical key
fn normalize(factors: Vec<Factor>) -> Vec<Factor> {
    let mut collapsed: Vec<Factor> = Vec::with_capacity(factors.len());
    for factor in factors {
        match collapsed.iter_mut().find(|f| f.same_unit(&factor)) {
            Some(existing) => existing.exponent = existing.exponent.saturating_add(factor.exponent),
            None => collapsed.push(factor),
        }
    }
    collapsed.retain(|f| f.exponent != 0);
    // sort_by_key is stable: ties keep their written order
    collapsed.sort_by_key(|f| f.sort_key());
    collapsed
}

fn write_group(f: &mut fmt::Formatter<'_>, group: &[Factor]) -> fmt::Result {
    for (i, factor) in group.iter().enumerate() {
        if i > 0 {
            write!(f, "_")?;
        }
        write!(f, "{}", factor)?;
    }
    Ok(())
}

impl fmt::Display for CompoundUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, &self.numerator)?;
        if !self.denominator.is_empty() {
            if self.numerator.is_empty() {
                write!(f, "per_")?;
            } else {
                write!(f, "_per_")?;
            }
            write_group(f, &self.denominator)?;
        }
        Ok(())
    }
}

impl Serialize for CompoundUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CompoundUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        crate::parse::canonicalize(&name).map_err(serde::de::Error::custom)
    }
}

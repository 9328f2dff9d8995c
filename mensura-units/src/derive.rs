//! Conversion derivation - closes the authored table over every localizable unit
//!
//! Four rules are applied in passes until nothing new resolves:
//! - SI: `kilometer` from `meter`, factor scaled by the prefix
//! - exponent: `square_foot` from `foot`, factor raised to the power
//! - per: `mile_per_gallon` from `mile` and `gallon`, factors divided
//! - compound: `kilowatt_hour` from `kilowatt` and `hour`, factors multiplied
//!
//! Each pass reads the table as it stood when the pass began; results merge
//! in the order above and an earlier rule keeps its entry on conflict.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace, warn};
use mensura_core::{IBig, MensuraError, RBig, Result};
use crate::{canonicalize, BaseTable, Category, CompoundUnit, Conversion, REGISTRY};
use crate::compound::{self, Atom, Factor};
use crate::conversion::ConversionKind;

/// Compound names shipped with the crate
const EMBEDDED_COMPOUNDS: &str = include_str!("../data/compounds.json");

/// Localizable compound names from a JSON array
pub fn compounds_from_json(json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json).map_err(|e| MensuraError::Data(format!("compound list: {}", e)))
}

/// Every registry atom, its prefixed forms, and the given compounds
pub fn universe(compounds: &[String]) -> Vec<String> {
    let mut names = REGISTRY.localizable();
    names.extend(compounds.iter().cloned());
    names
}

/// The localizable universe built from the shipped compound list
pub fn embedded_universe() -> Result<Vec<String>> {
    Ok(universe(&compounds_from_json(EMBEDDED_COMPOUNDS)?))
}

/// The complete conversion table. Read-only once derived.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversionTable {
    entries: BTreeMap<String, Conversion>,
    unconvertible: BTreeSet<String>,
}

impl ConversionTable {
    pub fn derive(base: &BaseTable, universe: &[String]) -> ConversionTable {
        let mut entries: BTreeMap<String, Conversion> = base.iter()
            .map(|(name, conversion)| (name.clone(), conversion.clone()))
            .collect();
        let authored = entries.len();

        // base units convert to themselves
        let bases: Vec<CompoundUnit> = entries.values()
            .map(|c| c.base.clone())
            .chain(Category::ALL.iter().filter_map(|c| compound::category_base(*c).cloned()))
            .collect();
        for unit in bases {
            entries.entry(unit.to_string()).or_insert_with(|| Conversion::identity(unit));
        }

        let mut localizable = BTreeSet::new();
        let mut unconvertible = BTreeSet::new();
        let mut targets: BTreeMap<String, CompoundUnit> = BTreeMap::new();
        for name in universe {
            match canonicalize(name) {
                Ok(unit) => {
                    localizable.insert(unit.to_string());
                    add_targets(&unit, &mut targets);
                }
                Err(err) => {
                    warn!(name = name.as_str(), error = %err, "localizable unit does not parse");
                    unconvertible.insert(crate::parse::normalize_name(name));
                }
            }
        }

        let mut passes = 0;
        loop {
            passes += 1;
            let pending: Vec<(&String, &CompoundUnit)> = targets.iter()
                .filter(|(name, _)| !entries.contains_key(*name))
                .collect();

            let apply = |rule: fn(&BTreeMap<String, Conversion>, &CompoundUnit) -> Option<Conversion>| {
                pending.iter()
                    .filter_map(|(name, unit)| rule(&entries, unit).map(|c| ((*name).clone(), c)))
                    .collect::<Vec<_>>()
            };
            let si = apply(si_rule);
            let exponent = apply(exponent_rule);
            let per = apply(per_rule);
            let product = apply(compound_rule);
            trace!(
                pass = passes,
                si = si.len(),
                exponent = exponent.len(),
                per = per.len(),
                compound = product.len(),
                "derivation pass"
            );

            let mut resolved = 0;
            for (name, conversion) in si.into_iter().chain(exponent).chain(per).chain(product) {
                if !entries.contains_key(&name) {
                    entries.insert(name, conversion);
                    resolved += 1;
                }
            }
            if resolved == 0 {
                break;
            }
        }

        for name in localizable {
            if !entries.contains_key(&name) {
                unconvertible.insert(name);
            }
        }

        debug!(
            authored,
            derived = entries.len() - authored,
            unconvertible = unconvertible.len(),
            passes,
            "derived conversion table"
        );

        ConversionTable { entries, unconvertible }
    }

    pub fn get(&self, name: &str) -> Option<&Conversion> {
        self.entries.get(name)
    }

    /// The conversion of a canonical unit.
    ///
    /// Names known to be unconvertible are reported as such, anything else
    /// missing is unknown.
    pub fn lookup(&self, unit: &CompoundUnit) -> Result<&Conversion> {
        let name = unit.to_string();
        self.entries.get(&name).ok_or_else(|| {
            if self.unconvertible.contains(&name) {
                MensuraError::Unconvertible(name)
            } else {
                MensuraError::UnknownUnit(name)
            }
        })
    }

    pub fn is_convertible(&self, name: &str) -> bool {
        canonicalize(name).map_or(false, |unit| self.entries.contains_key(&unit.to_string()))
    }

    /// Localizable names no rule could derive, sorted
    pub fn unconvertible_units(&self) -> Vec<&str> {
        self.unconvertible.iter().map(|s| s.as_str()).collect()
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

/// Queue a unit and the sub-units its rule will ask for
fn add_targets(unit: &CompoundUnit, targets: &mut BTreeMap<String, CompoundUnit>) {
    if unit.is_one() || is_numeric(unit) || targets.contains_key(&unit.to_string()) {
        return;
    }
    targets.insert(unit.to_string(), unit.clone());

    if unit.has_per() {
        add_targets(&unit.numerator_unit(), targets);
        add_targets(&unit.denominator_unit(), targets);
    } else if let Some(factor) = unit.single() {
        if factor.exponent > 1 {
            add_targets(&bare(factor, true), targets);
        } else if factor.prefix.is_some() {
            add_targets(&bare(factor, false), targets);
        }
    } else if let Some((first, rest)) = unit.numerator().split_first() {
        add_targets(&CompoundUnit::new(vec![first.clone()], vec![]), targets);
        add_targets(&CompoundUnit::new(rest.to_vec(), vec![]), targets);
    }
}

/// The factor's atom alone with exponent 1
fn bare(factor: &Factor, keep_prefix: bool) -> CompoundUnit {
    let prefix = if keep_prefix { factor.prefix } else { None };
    CompoundUnit::new(vec![Factor::new(prefix, factor.atom.clone(), 1)], vec![])
}

fn is_numeric(unit: &CompoundUnit) -> bool {
    !unit.has_per() && unit.numerator().iter().all(|f| matches!(f.atom, Atom::Numeric(_)))
}

/// Factor and base of a unit that composes: an entry without offset, or
/// numeric literals (factor n, dimensionless base)
fn linear(entries: &BTreeMap<String, Conversion>, unit: &CompoundUnit) -> Option<(RBig, CompoundUnit)> {
    if is_numeric(unit) {
        let factor = unit.numerator().iter().fold(RBig::ONE, |acc, f| match &f.atom {
            Atom::Numeric(n) => acc * rational_pow(&RBig::from(IBig::from(n.clone())), f.exponent),
            _ => acc,
        });
        return Some((factor, CompoundUnit::one()));
    }
    let conversion = entries.get(&unit.to_string())?;
    Some((conversion.linear_factor()?.clone(), conversion.base.clone()))
}

fn si_rule(entries: &BTreeMap<String, Conversion>, unit: &CompoundUnit) -> Option<Conversion> {
    let part = unit.single()?;
    let prefix = part.prefix?;
    if part.exponent != 1 {
        return None;
    }
    let unprefixed = entries.get(&bare(part, false).to_string())?;
    match &unprefixed.kind {
        ConversionKind::Affine { factor, offset } => Some(Conversion::affine(
            unprefixed.base.clone(),
            factor * &power_of_ten(prefix.power()),
            offset.clone(),
        )),
        ConversionKind::Special(_) => None,
    }
}

fn exponent_rule(entries: &BTreeMap<String, Conversion>, unit: &CompoundUnit) -> Option<Conversion> {
    let part = unit.single()?;
    if part.exponent < 2 {
        return None;
    }
    let (scale, base) = linear(entries, &bare(part, true))?;
    Some(Conversion::affine(
        base.pow(part.exponent),
        rational_pow(&scale, part.exponent),
        RBig::ZERO,
    ))
}

fn per_rule(entries: &BTreeMap<String, Conversion>, unit: &CompoundUnit) -> Option<Conversion> {
    if !unit.has_per() {
        return None;
    }
    let (num_factor, num_base) = linear(entries, &unit.numerator_unit())?;
    let (den_factor, den_base) = linear(entries, &unit.denominator_unit())?;
    Some(Conversion::affine(
        num_base.product(&den_base.inverse()),
        num_factor / den_factor,
        RBig::ZERO,
    ))
}

fn compound_rule(entries: &BTreeMap<String, Conversion>, unit: &CompoundUnit) -> Option<Conversion> {
    let factors = unit.numerator();
    if unit.has_per() || factors.len() < 2 {
        return None;
    }
    (1..factors.len()).find_map(|split| {
        let left = CompoundUnit::new(factors[..split].to_vec(), vec![]);
        let right = CompoundUnit::new(factors[split..].to_vec(), vec![]);
        let (left_factor, left_base) = linear(entries, &left)?;
        let (right_factor, right_base) = linear(entries, &right)?;
        Some(Conversion::affine(
            left_base.product(&right_base),
            left_factor * right_factor,
            RBig::ZERO,
        ))
    })
}

fn power_of_ten(power: i32) -> RBig {
    rational_pow(&RBig::from(IBig::from(10)), power)
}

fn rational_pow(base: &RBig, exp: i32) -> RBig {
    let mut result = RBig::ONE;
    for _ in 0..exp.unsigned_abs() {
        result = &result * base;
    }
    if exp < 0 {
        RBig::ONE / result
    } else {
        result
    }
}

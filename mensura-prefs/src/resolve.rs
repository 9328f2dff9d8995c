//! Preferred units for a value, usage and territory

use tracing::{debug, trace};
use mensura_core::{MensuraError, Number, Result};
use mensura_units::{category_of, convert_to, ConversionTable, Unit};
use crate::{Preference, PreferenceTable, Territory};

/// What the value is used for and where it is shown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceOptions {
    /// `person_height`, `road`, `vehicle_fuel`...
    pub usage: Option<String>,
    /// Narrows a usage (`small` distances within `road`)
    pub scope: Option<String>,
    /// Formality variant (`informal`)
    pub alt: Option<String>,
    pub territory: Territory,
}

impl PreferenceOptions {
    pub fn new(usage: &str) -> Self {
        PreferenceOptions {
            usage: Some(usage.to_string()),
            ..Default::default()
        }
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn with_alt(mut self, alt: &str) -> Self {
        self.alt = Some(alt.to_string());
        self
    }

    pub fn with_territory(mut self, territory: Territory) -> Self {
        self.territory = territory;
        self
    }
}

/// Preferred unit names for a value, most specific data first.
///
/// The lookup walks `[scope, alt, T]`, `[scope, T]`, `[alt, T]`, `[T]` for the
/// requested territory, then the same four keys for the world. Steps that
/// need an absent scope or alt are skipped. When nothing matches the value
/// keeps its own unit.
pub fn preferred_units(
    prefs: &PreferenceTable,
    conversions: &ConversionTable,
    unit: &Unit,
    options: &PreferenceOptions,
) -> Result<Vec<String>> {
    let category = category_of(conversions, &unit.name)?;
    let unknown_usage = || MensuraError::UnknownUsage {
        category: category.name().to_string(),
        usage: options.usage.clone(),
        known: prefs.usages(category).into_iter().map(str::to_string).collect(),
    };
    let usage = options.usage.as_deref().ok_or_else(unknown_usage)?;
    if !prefs.has_usage(category, usage) {
        return Err(unknown_usage());
    }

    let scope = options.scope.as_deref();
    let alt = options.alt.as_deref();
    let world = Territory::world();

    for territory in [&options.territory, &world] {
        let steps = [
            (scope, alt, scope.is_some() && alt.is_some()),
            (scope, None, scope.is_some()),
            (None, alt, alt.is_some()),
            (None, None, true),
        ];
        for (scope, alt, applies) in steps {
            if !applies {
                continue;
            }
            trace!(usage, ?scope, ?alt, %territory, "preference lookup");
            if let Some(rows) = prefs.rows(category, usage, scope, alt, territory) {
                let row = select_row(conversions, unit, rows)?;
                debug!(
                    category = category.name(),
                    usage,
                    %territory,
                    units = row.units.len(),
                    "preference found"
                );
                return Ok(row.units.iter().map(|u| u.to_string()).collect());
            }
        }
    }

    debug!(category = category.name(), usage, "no preference data, keeping unit");
    Ok(vec![unit.name.to_string()])
}

/// First row whose threshold the value meets; the last row otherwise
fn select_row<'a>(conversions: &ConversionTable, unit: &Unit, rows: &'a [Preference]) -> Result<&'a Preference> {
    for row in rows {
        let (Some(geq), Some(first)) = (&row.geq, row.units.first()) else {
            return Ok(row);
        };
        let value = convert_to(conversions, unit, first)?.value;
        if value >= Number::from_rational(geq.clone()) {
            return Ok(row);
        }
    }
    rows.last().ok_or_else(|| MensuraError::Data("preference without rows".to_string()))
}

/// Convert to the preferred units, decomposing over several if needed
pub fn to_preferred_units(
    prefs: &PreferenceTable,
    conversions: &ConversionTable,
    unit: &Unit,
    options: &PreferenceOptions,
) -> Result<Vec<Unit>> {
    let names = preferred_units(prefs, conversions, unit, options)?;
    decompose(conversions, unit, &names[..])
}

/// Split a value over several units, largest first.
///
/// Every unit but the last takes the integral part (truncated toward
/// zero); the last carries the remainder, so 1.8 meter over
/// `foot, inch` is 5 foot and 10.866... inch.
pub fn decompose<S: AsRef<str>>(conversions: &ConversionTable, unit: &Unit, names: &[S]) -> Result<Vec<Unit>> {
    let Some((last, leading)) = names.split_last() else {
        return Ok(vec![unit.clone()]);
    };

    let mut parts = Vec::with_capacity(names.len());
    let mut remaining = unit.clone();
    for name in leading {
        let converted = mensura_units::convert(conversions, &remaining, name.as_ref())?;
        let whole = converted.value.trunc();
        let rest = converted.value.sub(&whole);
        parts.push(Unit::from_compound(whole, converted.name.clone()));
        remaining = Unit::from_compound(rest, converted.name);
    }
    parts.push(mensura_units::convert(conversions, &remaining, last.as_ref())?);
    Ok(parts)
}

//! Converting unit values through the derived table

use tracing::debug;
use mensura_core::{MensuraError, Result};
use crate::{canonicalize, Category, CompoundUnit, ConversionTable, Unit};
use crate::compound::category_base;

/// Category of a unit.
///
/// A lone atom answers directly. Otherwise the unit's conversion base is
/// matched against the category bases (the inverse counts where the
/// category allows reciprocal units), and failing that its signature.
pub fn category_of(table: &ConversionTable, unit: &CompoundUnit) -> Result<Category> {
    if let Some(factor) = unit.single() {
        if factor.exponent == 1 {
            if let Some(category) = factor.atom.category() {
                return Ok(category);
            }
        }
    }

    let matches = |candidate: &CompoundUnit, category: Category, base: &CompoundUnit| {
        candidate == base || (category.allows_reciprocal() && candidate.inverse() == *base)
    };

    if let Some(conversion) = table.get(&unit.to_string()) {
        for category in Category::ALL {
            if let Some(base) = category_base(category) {
                if matches(&conversion.base, category, base) {
                    return Ok(category);
                }
            }
        }
    }

    let signature = unit.signature();
    for category in Category::ALL {
        if let Some(base) = category_base(category) {
            if matches(&signature, category, &base.signature()) {
                return Ok(category);
            }
        }
    }

    Err(MensuraError::UnknownCategory(unit.to_string()))
}

/// Convert a value to the named unit
pub fn convert(table: &ConversionTable, unit: &Unit, to: &str) -> Result<Unit> {
    let target = canonicalize(to)?;
    convert_to(table, unit, &target)
}

/// Convert a value to an already canonical unit
pub fn convert_to(table: &ConversionTable, unit: &Unit, target: &CompoundUnit) -> Result<Unit> {
    let from = table.lookup(&unit.name)?;
    let to = table.lookup(target)?;

    let base_value = from.to_base(&unit.value)?;
    if from.base == to.base {
        return Ok(Unit::from_compound(to.from_base(&base_value)?, target.clone()));
    }

    // Bases written differently: reconcile within one category
    let from_category = category_of(table, &unit.name).ok();
    let to_category = category_of(table, target).ok();
    let incompatible = || MensuraError::IncompatibleUnits {
        from: unit.name.to_string(),
        to: target.to_string(),
        from_category: from_category.map_or("unknown", |c| c.name()).to_string(),
        to_category: to_category.map_or("unknown", |c| c.name()).to_string(),
    };
    if from_category.is_none() || from_category != to_category {
        return Err(incompatible());
    }

    let from_signature = from.base.signature();
    let to_signature = to.base.signature();
    let value = if from_signature == to_signature {
        debug!(from = %from.base, to = %to.base, "converting through shared signature");
        to.from_base(&base_value)?
    } else if from_signature == to_signature.inverse() {
        debug!(from = %from.base, to = %to.base, "converting through reciprocal");
        to.from_base(&base_value.checked_recip()?)?
    } else {
        return Err(incompatible());
    };

    Ok(Unit::from_compound(value, target.clone()))
}

/// The value expressed in its conversion base
pub fn convert_to_base(table: &ConversionTable, unit: &Unit) -> Result<Unit> {
    let conversion = table.lookup(&unit.name)?;
    Ok(Unit::from_compound(conversion.to_base(&unit.value)?, conversion.base.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;
    use mensura_core::{Number, NumberKind, codes};
    use crate::{embedded_universe, BaseTable};

    static TABLE: LazyLock<ConversionTable> = LazyLock::new(|| {
        ConversionTable::derive(&BaseTable::embedded().unwrap(), &embedded_universe().unwrap())
    });

    fn value(v: i64, name: &str) -> Unit {
        Unit::new(Number::from_i64(v), name).unwrap()
    }

    fn category(name: &str) -> Category {
        category_of(&TABLE, &canonicalize(name).unwrap()).unwrap()
    }

    #[test]
    fn test_category_of() {
        assert_eq!(category("foot"), Category::Length);
        assert_eq!(category("kilometer"), Category::Length);
        assert_eq!(category("square_foot"), Category::Area);
        assert_eq!(category("kilometer_per_hour"), Category::Speed);
        assert_eq!(category("kilowatt_hour"), Category::Energy);
        assert_eq!(category("liter_per_100_kilometer"), Category::Consumption);
        assert_eq!(category("mile_per_gallon"), Category::Consumption);
        assert_eq!(category("pound_force_per_square_inch"), Category::Pressure);
        assert_eq!(category("revolution_per_minute"), Category::Frequency);

        assert_eq!(category("gram_per_liter"), Category::MassDensity);
        assert_eq!(category("gram_per_cubic_centimeter"), Category::MassDensity);
        assert_eq!(category("milligram_per_deciliter"), Category::MassDensity);
        assert_eq!(category("mole_per_liter"), Category::Molarity);
        assert_eq!(category("millimole_per_liter"), Category::Molarity);

        let err = category_of(&TABLE, &canonicalize("kilogram_meter").unwrap()).unwrap_err();
        assert_eq!(err.code(), codes::UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_every_convertible_localizable_unit_has_category() {
        for name in embedded_universe().unwrap() {
            let unit = canonicalize(&name).unwrap();
            if TABLE.lookup(&unit).is_err() {
                continue;
            }
            assert!(category_of(&TABLE, &unit).is_ok(), "no category for {}", name);
        }
    }

    #[test]
    fn test_direct_conversion_exact() {
        let km = convert(&TABLE, &value(5000, "meter"), "kilometer").unwrap();
        assert_eq!(km.value, Number::from_i64(5));
        assert_eq!(km.value.kind(), NumberKind::Integer);
        assert_eq!(km.name.to_string(), "kilometer");

        let inches = convert(&TABLE, &value(1, "foot"), "inch").unwrap();
        assert_eq!(inches.value, Number::from_i64(12));
    }

    #[test]
    fn test_temperature() {
        let f = convert(&TABLE, &value(100, "celsius"), "fahrenheit").unwrap();
        assert_eq!(f.value, Number::from_i64(212));

        let c = convert(&TABLE, &value(-40, "fahrenheit"), "celsius").unwrap();
        assert_eq!(c.value, Number::from_i64(-40));

        let k = convert(&TABLE, &value(0, "celsius"), "kelvin").unwrap();
        assert_eq!(k.value.as_decimal(2), "273.15");
    }

    #[test]
    fn test_category_level_fallback_energy() {
        let joules = convert(&TABLE, &value(1, "kilowatt_hour"), "joule").unwrap();
        assert_eq!(joules.value, Number::from_i64(3_600_000));

        let kwh = convert(&TABLE, &value(7_200_000, "joule"), "kilowatt_hour").unwrap();
        assert_eq!(kwh.value, Number::from_i64(2));
    }

    #[test]
    fn test_reciprocal_consumption() {
        let l100 = convert(&TABLE, &value(30, "mile_per_gallon"), "liter_per_100_kilometer").unwrap();
        assert_eq!(l100.value.as_decimal(6), "7.840486");

        let back = convert(&TABLE, &l100, "mile_per_gallon").unwrap();
        assert_eq!(back.value, Number::from_i64(30));

        let zero = value(0, "mile_per_gallon");
        assert_eq!(
            convert(&TABLE, &zero, "liter_per_100_kilometer").unwrap_err().code(),
            codes::NUMBER_ERROR
        );
    }

    #[test]
    fn test_incompatible() {
        let err = convert(&TABLE, &value(1, "meter"), "liter").unwrap_err();
        assert_eq!(
            err,
            MensuraError::IncompatibleUnits {
                from: "meter".to_string(),
                to: "liter".to_string(),
                from_category: "length".to_string(),
                to_category: "volume".to_string(),
            }
        );
        // same signature, different categories
        let err = convert(&TABLE, &value(1, "square_meter"), "liter_per_100_kilometer").unwrap_err();
        assert_eq!(err.code(), codes::INCOMPATIBLE_UNITS);
    }

    #[test]
    fn test_unknown_and_unconvertible() {
        let err = convert(&TABLE, &value(1, "meter"), "fortnight").unwrap_err();
        assert_eq!(err.code(), codes::UNKNOWN_UNIT);

        let price = Unit::new(Number::from_i64(3), "curr_usd_per_gallon").unwrap();
        let err = convert(&TABLE, &price, "curr_usd_per_liter").unwrap_err();
        assert_eq!(err.code(), codes::UNCONVERTIBLE_UNIT);
    }

    #[test]
    fn test_special_conversion() {
        let knots = convert(&TABLE, &value(12, "beaufort"), "knot").unwrap();
        assert!((knots.value.to_f64().unwrap() - 67.55).abs() < 1e-2);

        let calm = convert(&TABLE, &value(0, "knot"), "beaufort").unwrap();
        assert!(calm.value.is_zero());

        let err = convert(&TABLE, &value(-3, "beaufort"), "knot").unwrap_err();
        assert_eq!(err.code(), codes::NUMBER_ERROR);
    }

    #[test]
    fn test_float_values() {
        let unit = Unit::new(Number::from_f64(1.5), "hour").unwrap();
        let minutes = convert(&TABLE, &unit, "minute").unwrap();
        assert_eq!(minutes.value.kind(), NumberKind::Float);
        assert!((minutes.value.to_f64().unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_exact() {
        let pairs = [
            ("mile", "kilometer"), ("pound", "gram"), ("gallon", "liter"),
            ("acre", "square_foot"), ("fahrenheit", "kelvin"), ("knot", "kilometer_per_hour"),
            ("pound_force_per_square_inch", "hectopascal"), ("degree", "radian"),
        ];
        for (a, b) in pairs {
            let start = Unit::new(Number::from_ratio(7, 3).unwrap(), a).unwrap();
            let there = convert(&TABLE, &start, b).unwrap();
            let back = convert(&TABLE, &there, a).unwrap();
            assert_eq!(back, start, "{} -> {} -> {}", a, b, a);
        }
    }

    #[test]
    fn test_convert_to_base() {
        let base = convert_to_base(&TABLE, &value(2, "kilowatt_hour")).unwrap();
        assert_eq!(base.name.to_string(), "kilogram_square_meter_second_per_cubic_second");
        assert_eq!(base.value, Number::from_i64(7_200_000));

        let psi = convert(&TABLE, &value(1, "pound_force_per_square_inch"), "pascal").unwrap();
        assert_eq!(psi.value.as_decimal(3), "6894.757");
    }
}

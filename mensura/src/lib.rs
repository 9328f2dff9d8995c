//! Mensura - Unit Algebra Engine
//!
//! Canonicalizes compound unit names, converts values exactly between them,
//! and resolves the units a region prefers for a usage.
//!
//! ```ignore
//! let engine = mensura::initialize()?;
//! let fuel = engine.unit(Number::from_i64(30), "mile_per_gallon")?;
//! let metric = engine.convert(&fuel, "liter_per_100_kilometer")?;
//! assert_eq!(metric.value.as_decimal(6), "7.840486");
//! ```

use std::sync::{Arc, OnceLock};
use tracing::debug;

pub use mensura_core::{MensuraError, Number, NumberKind, NumberError, Result, codes};
pub use mensura_units::{Category, CompoundUnit, ConversionTable, Unit};
pub use mensura_prefs::{PreferenceOptions, PreferenceTable, Territory};

use mensura_units::{Atom, BaseTable, Factor, REGISTRY, compounds_from_json, embedded_universe, universe};

/// Process-wide engine built from the embedded data
static ENGINE: OnceLock<Mensura> = OnceLock::new();

/// The shared engine, built on first use.
///
/// Tables are derived eagerly and never change afterwards.
pub fn initialize() -> Result<&'static Mensura> {
    if let Some(engine) = ENGINE.get() {
        return Ok(engine);
    }
    let engine = Mensura::initialize()?;
    Ok(ENGINE.get_or_init(|| engine))
}

/// Main Mensura engine
#[derive(Debug, Clone)]
pub struct Mensura {
    conversions: Arc<ConversionTable>,
    preferences: Arc<PreferenceTable>,
}

impl Mensura {
    /// Build from the data shipped with the crates
    pub fn initialize() -> Result<Self> {
        let base = BaseTable::embedded()?;
        let names = embedded_universe()?;
        Ok(Self::build(&base, &names, PreferenceTable::embedded()?))
    }

    /// Build from caller-supplied JSON data
    pub fn with_data(conversions_json: &str, compounds_json: &str, preferences_json: &str) -> Result<Self> {
        let base = BaseTable::from_json(conversions_json)?;
        let names = universe(&compounds_from_json(compounds_json)?);
        Ok(Self::build(&base, &names, PreferenceTable::from_json(preferences_json)?))
    }

    fn build(base: &BaseTable, names: &[String], preferences: PreferenceTable) -> Self {
        let conversions = ConversionTable::derive(base, names);
        debug!(
            conversions = conversions.len(),
            unconvertible = conversions.unconvertible_units().len(),
            "mensura engine ready"
        );
        Mensura {
            conversions: Arc::new(conversions),
            preferences: Arc::new(preferences),
        }
    }

    pub fn canonicalize(&self, name: &str) -> Result<CompoundUnit> {
        mensura_units::canonicalize(name)
    }

    /// A value in a validated unit
    pub fn unit(&self, value: impl Into<Number>, name: &str) -> Result<Unit> {
        Unit::new(value, name)
    }

    pub fn convert(&self, unit: &Unit, to: &str) -> Result<Unit> {
        mensura_units::convert(&self.conversions, unit, to)
    }

    /// Preferred unit names for the value's category, usage and territory
    pub fn preferred_units(&self, unit: &Unit, options: &PreferenceOptions) -> Result<Vec<String>> {
        mensura_prefs::preferred_units(&self.preferences, &self.conversions, unit, options)
    }

    /// The value converted to its preferred units
    pub fn to_preferred_units(&self, unit: &Unit, options: &PreferenceOptions) -> Result<Vec<Unit>> {
        mensura_prefs::to_preferred_units(&self.preferences, &self.conversions, unit, options)
    }

    pub fn decompose(&self, unit: &Unit, names: &[&str]) -> Result<Vec<Unit>> {
        mensura_prefs::decompose(&self.conversions, unit, names)
    }

    /// Resolve an abbreviated unit name such as `fahr`.
    ///
    /// An exact name wins; otherwise exactly one unit in `filter` (any
    /// category when empty) may start with the token.
    pub fn resolve_partial(&self, token: &str, filter: &[Category]) -> Result<CompoundUnit> {
        let id = REGISTRY.resolve_partial(token, filter)?;
        Ok(CompoundUnit::new(vec![Factor::new(None, Atom::Known(id), 1)], vec![]))
    }

    pub fn is_convertible(&self, name: &str) -> bool {
        self.conversions.is_convertible(name)
    }

    pub fn category_of(&self, name: &str) -> Result<Category> {
        let unit = self.canonicalize(name)?;
        mensura_units::category_of(&self.conversions, &unit)
    }

    pub fn unconvertible_units(&self) -> Vec<&str> {
        self.conversions.unconvertible_units()
    }

    pub fn territory_from_locale(&self, tag: &str) -> Result<Territory> {
        mensura_prefs::territory_from_locale(tag)
    }

    pub fn conversions(&self) -> &ConversionTable {
        &self.conversions
    }

    pub fn preferences(&self) -> &PreferenceTable {
        &self.preferences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mensura_units::SiPrefix;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    }

    fn engine() -> &'static Mensura {
        init_tracing();
        initialize().unwrap()
    }

    fn exact(engine: &Mensura, value: &str, name: &str) -> Unit {
        engine.unit(Number::from_str(value).unwrap(), name).unwrap()
    }

    #[test]
    fn test_global_engine_is_shared() {
        let a = engine();
        let b = initialize().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Mensura>();
    }

    #[test]
    fn test_canonicalization_idempotent() {
        let engine = engine();
        let names = [
            "meter", "Kilometer-Per-Hour", "hour_kilowatt", "meter_meter_meter",
            "liter_per_100_kilometer", "pound_force_per_square_inch", "per_second",
            "kilogram_square_meter_second_per_cubic_second", "pow7_millimeter",
            "curr_usd_per_gallon", "mile_per_gallon_imperial", "newton_meter",
        ];
        for name in names {
            let once = engine.canonicalize(name).unwrap();
            let twice = engine.canonicalize(&once.to_string()).unwrap();
            assert_eq!(once, twice, "{}", name);
        }
    }

    #[test]
    fn test_round_trip_exact() {
        let engine = engine();
        let pairs = [
            ("meter", "foot"), ("kilogram", "ounce"), ("liter", "cup"),
            ("hectare", "acre"), ("celsius", "fahrenheit"), ("kilowatt_hour", "joule"),
            ("mile_per_gallon", "liter_per_100_kilometer"), ("kilometer_per_hour", "knot"),
            ("byte", "kilobit"), ("week", "minute"),
        ];
        for (a, b) in pairs {
            let start = exact(engine, "29/4", a);
            let there = engine.convert(&start, b).unwrap();
            let back = engine.convert(&there, a).unwrap();
            assert_eq!(back, start, "{} <-> {}", a, b);
        }
    }

    #[test]
    fn test_si_closure() {
        let engine = engine();
        for prefix in SiPrefix::ALL {
            for base in ["meter", "second", "liter"] {
                let name = format!("{}{}", prefix.name(), base);
                let one = engine.unit(Number::from_i64(1), &name).unwrap();
                let converted = engine.convert(&one, base).unwrap();
                let expected = Number::from_str(&format!("1e{}", prefix.power())).unwrap();
                assert_eq!(converted.value, expected, "{}", name);
            }
        }
    }

    #[test]
    fn test_power_composition() {
        let engine = engine();
        let meter = engine.unit(Number::from_i64(1), "meter").unwrap();
        let square = meter.mult(&meter);
        assert_eq!(square, engine.unit(Number::from_i64(1), "square_meter").unwrap());
        assert_eq!(square.mult(&meter), engine.unit(Number::from_i64(1), "cubic_meter").unwrap());
        assert_eq!(square.mult(&square), engine.unit(Number::from_i64(1), "pow4_meter").unwrap());
    }

    #[test]
    fn test_per_unit_inversion() {
        let engine = engine();
        let fuel = engine.unit(Number::from_i64(30), "mile_per_gallon").unwrap();
        let metric = engine.convert(&fuel, "liter_per_100_kilometer").unwrap();
        assert_eq!(metric.value.as_decimal(6), "7.840486");
    }

    #[test]
    fn test_category_level_fallback() {
        let engine = engine();
        let energy = engine.unit(Number::from_i64(1), "kilowatt_hour").unwrap();
        let joules = engine.convert(&energy, "joule").unwrap();
        assert_eq!(joules.value, Number::from_i64(3_600_000));
        let back = engine.convert(&joules, "kilowatt_hour").unwrap();
        assert_eq!(back.value, Number::from_i64(1));
        assert_eq!(engine.category_of("kilowatt_hour").unwrap(), Category::Energy);
    }

    #[test]
    fn test_category_mismatch() {
        let engine = engine();
        let length = engine.unit(Number::from_i64(1), "meter").unwrap();
        let err = engine.convert(&length, "liter").unwrap_err();
        assert_eq!(err.code(), codes::INCOMPATIBLE_UNITS);
    }

    #[test]
    fn test_unconvertible() {
        let engine = engine();
        assert!(engine.unconvertible_units().contains(&"curr_usd_per_gallon"));
        assert!(!engine.is_convertible("curr_usd_per_gallon"));
        assert!(engine.is_convertible("kilometer_per_hour"));
        assert!(!engine.is_convertible("fortnight"));

        let price = engine.unit(Number::from_i64(4), "curr_usd_per_gallon").unwrap();
        let err = engine.convert(&price, "curr_usd_per_liter").unwrap_err();
        assert_eq!(err.code(), codes::UNCONVERTIBLE_UNIT);
    }

    #[test]
    fn test_derivation_deterministic() {
        init_tracing();
        let first = Mensura::initialize().unwrap();
        let second = Mensura::initialize().unwrap();
        assert_eq!(first.conversions(), second.conversions());
    }

    #[test]
    fn test_preference_fallback() {
        let engine = engine();
        let temperature = engine.unit(Number::from_i64(21), "celsius").unwrap();
        let gb = engine.territory_from_locale("en-GB").unwrap();
        let options = PreferenceOptions::new("weather").with_territory(gb);
        assert_eq!(engine.preferred_units(&temperature, &options).unwrap(), ["celsius"]);

        let us = engine.territory_from_locale("en").unwrap();
        let options = PreferenceOptions::new("weather").with_territory(us);
        let parts = engine.to_preferred_units(&temperature, &options).unwrap();
        assert_eq!(parts[0].name.to_string(), "fahrenheit");
        assert_eq!(parts[0].value.as_decimal(1), "69.8");
    }

    #[test]
    fn test_mixed_units() {
        let engine = engine();
        let height = exact(engine, "1.8", "meter");
        let territory = engine.territory_from_locale("en-US").unwrap();
        let options = PreferenceOptions::new("person_height").with_territory(territory);
        let parts = engine.to_preferred_units(&height, &options).unwrap();
        assert_eq!(parts[0].to_string(), "5 foot");
        assert_eq!(parts[1].value.as_decimal(3), "10.866");

        let same = engine.decompose(&height, &["foot", "inch"]).unwrap();
        assert_eq!(same, parts);
    }

    #[test]
    fn test_with_data() {
        init_tracing();
        let conversions = r#"{
            "foot": {"base": "meter", "factor": "0.3048"},
            "inch": {"base": "meter", "factor": "0.0254"}
        }"#;
        let compounds = r#"["square_foot", "curr_eur_per_foot"]"#;
        let preferences = r#"[{"category": "length", "usage": "default", "regions": ["001"],
            "preferences": [{"units": ["inch"]}]}]"#;
        let engine = Mensura::with_data(conversions, compounds, preferences).unwrap();

        let foot = engine.unit(Number::from_i64(1), "foot").unwrap();
        assert_eq!(engine.convert(&foot, "inch").unwrap().value, Number::from_i64(12));

        let area = engine.unit(Number::from_i64(1), "square_foot").unwrap();
        let metric = engine.convert(&area, "square_meter").unwrap();
        assert_eq!(metric.value.as_decimal(8), "0.09290304");

        let unconvertible = engine.unconvertible_units();
        assert!(unconvertible.contains(&"curr_eur_per_foot"));
        assert!(unconvertible.contains(&"gram"));

        let names = engine.preferred_units(&foot, &PreferenceOptions::new("default")).unwrap();
        assert_eq!(names, ["inch"]);

        let err = Mensura::with_data("[]", compounds, preferences).unwrap_err();
        assert_eq!(err.code(), codes::DATA_ERROR);
    }

    #[test]
    fn test_resolve_partial() {
        let engine = engine();
        assert_eq!(engine.resolve_partial("fahr", &[]).unwrap().to_string(), "fahrenheit");
        assert_eq!(engine.resolve_partial("Mile", &[]).unwrap().to_string(), "mile");
        assert_eq!(engine.resolve_partial("po", &[Category::Mass]).unwrap().to_string(), "pound");

        let err = engine.resolve_partial("po", &[]).unwrap_err();
        assert_eq!(err.code(), codes::AMBIGUOUS_UNIT);
        assert_eq!(engine.resolve_partial("zzz", &[]).unwrap_err().code(), codes::UNKNOWN_UNIT);
    }

    #[test]
    fn test_locale_errors_surface() {
        let engine = engine();
        let err = engine.territory_from_locale("not a locale").unwrap_err();
        assert_eq!(err.code(), codes::LOCALE_ERROR);
    }
}

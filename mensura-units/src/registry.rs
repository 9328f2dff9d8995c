//! Atomic unit registry - the fixed set of units compound names are built from

use std::collections::HashMap;
use std::sync::LazyLock;
use serde::{Serialize, Deserialize};
use mensura_core::{MensuraError, Result};
use crate::{Category, CompoundUnit, SiPrefix};
use crate::compound::Atom;

/// Global atom registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Measurement system an atom is customary in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum System {
    Metric,
    UsSystem,
    UkSystem,
}

const METRIC: &[System] = &[System::Metric];
const US: &[System] = &[System::UsSystem];
const UK: &[System] = &[System::UkSystem];
const US_UK: &[System] = &[System::UsSystem, System::UkSystem];
const ALL: &[System] = &[System::Metric, System::UsSystem, System::UkSystem];
const NONE: &[System] = &[];

/// Index of an atom in the registry table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(u16);

impl UnitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicUnit {
    pub name: &'static str,
    pub category: Category,
    pub systems: &'static [System],
    /// Accepts SI prefixes (`kilometer`, `millimeter_ofhg`)
    pub prefixable: bool,
}

/// Registry of all known atoms
pub struct Registry {
    atoms: Vec<AtomicUnit>,
    by_name: HashMap<&'static str, UnitId>,
}

impl Registry {
    pub fn new() -> Self {
        let mut registry = Registry {
            atoms: Vec::new(),
            by_name: HashMap::new(),
        };
        registry.register_all_units();
        registry
    }

    /// Look up an atom by exact name
    pub fn get(&self, name: &str) -> Option<UnitId> {
        self.by_name.get(name).copied()
    }

    pub fn atom(&self, id: UnitId) -> &AtomicUnit {
        &self.atoms[id.index()]
    }

    pub fn atoms(&self) -> impl Iterator<Item = (UnitId, &AtomicUnit)> + '_ {
        self.atoms.iter().enumerate().map(|(i, a)| (UnitId(i as u16), a))
    }

    /// Category of the atom with this name
    pub fn category(&self, name: &str) -> Option<Category> {
        self.get(name).map(|id| self.atom(id).category)
    }

    pub fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }

    /// Resolve an abbreviated atom name.
    ///
    /// An exact name always wins; otherwise the token must be the prefix of
    /// exactly one atom in the filter categories (all categories when the
    /// filter is empty).
    pub fn resolve_partial(&self, token: &str, filter: &[Category]) -> Result<UnitId> {
        let token = token.trim().to_lowercase().replace('-', "_");
        if let Some(id) = self.get(&token) {
            return Ok(id);
        }

        let candidates: Vec<(UnitId, &AtomicUnit)> = self.atoms()
            .filter(|(_, a)| filter.is_empty() || filter.contains(&a.category))
            .filter(|(_, a)| a.name.starts_with(token.as_str()))
            .collect();

        match candidates.as_slice() {
            [] => Err(MensuraError::UnknownUnit(token)),
            [(id, _)] => Ok(*id),
            many => {
                let mut names: Vec<String> = many.iter().map(|(_, a)| a.name.to_string()).collect();
                names.sort();
                Err(MensuraError::AmbiguousUnit { token, candidates: names })
            }
        }
    }

    /// Systems shared by every atom of the unit
    pub fn systems_of(&self, unit: &CompoundUnit) -> Vec<System> {
        let mut systems = ALL.to_vec();
        for factor in unit.factors() {
            if let Atom::Known(id) = factor.atom {
                let atom_systems = self.atom(id).systems;
                systems.retain(|s| atom_systems.contains(s));
            }
        }
        systems
    }

    /// Every atom name plus the SI-prefixed form of each prefixable atom
    pub fn localizable(&self) -> Vec<String> {
        let mut names = Vec::new();
        for atom in &self.atoms {
            names.push(atom.name.to_string());
            if atom.prefixable {
                for prefix in SiPrefix::ALL {
                    names.push(format!("{}{}", prefix.name(), atom.name));
                }
            }
        }
        names
    }

    fn register(&mut self, name: &'static str, category: Category, systems: &'static [System], prefixable: bool) {
        let id = UnitId(self.atoms.len() as u16);
        self.atoms.push(AtomicUnit { name, category, systems, prefixable });
        self.by_name.insert(name, id);
    }

    fn register_all_units(&mut self) {
        self.register_length_units();
        self.register_mass_units();
        self.register_duration_units();
        self.register_electrical_units();
        self.register_temperature_units();
        self.register_amount_units();
        self.register_luminosity_units();
        self.register_angle_units();
        self.register_digital_units();
        self.register_concentration_units();
        self.register_area_units();
        self.register_volume_units();
        self.register_speed_units();
        self.register_acceleration_units();
        self.register_force_units();
        self.register_energy_units();
        self.register_power_units();
        self.register_pressure_units();
        self.register_frequency_units();
    }

    fn register_length_units(&mut self) {
        use Category::Length;
        self.register("meter", Length, METRIC, true);
        self.register("foot", Length, US_UK, false);
        self.register("inch", Length, US_UK, false);
        self.register("yard", Length, US_UK, false);
        self.register("mile", Length, US_UK, false);
        self.register("fathom", Length, US_UK, false);
        self.register("furlong", Length, US_UK, false);
        self.register("nautical_mile", Length, ALL, false);
        self.register("mile_scandinavian", Length, METRIC, false);
        self.register("light_year", Length, NONE, false);
        self.register("astronomical_unit", Length, NONE, false);
        self.register("parsec", Length, NONE, false);
        self.register("point", Length, NONE, false);
    }

    fn register_mass_units(&mut self) {
        use Category::Mass;
        self.register("gram", Mass, METRIC, true);
        self.register("tonne", Mass, METRIC, false);
        self.register("pound", Mass, US_UK, false);
        self.register("ounce", Mass, US_UK, false);
        self.register("ounce_troy", Mass, US_UK, false);
        self.register("stone", Mass, UK, false);
        self.register("ton", Mass, US, false);
        self.register("carat", Mass, NONE, false);
        self.register("grain", Mass, US_UK, false);
    }

    fn register_duration_units(&mut self) {
        use Category::Duration;
        self.register("second", Duration, ALL, true);
        self.register("minute", Duration, ALL, false);
        self.register("hour", Duration, ALL, false);
        self.register("day", Duration, ALL, false);
        self.register("week", Duration, ALL, false);
        self.register("month", Duration, ALL, false);
        self.register("year", Duration, ALL, false);
        self.register("decade", Duration, ALL, false);
        self.register("century", Duration, ALL, false);
    }

    fn register_electrical_units(&mut self) {
        self.register("ampere", Category::ElectricCurrent, ALL, true);
        self.register("volt", Category::Voltage, ALL, true);
        self.register("ohm", Category::Resistance, ALL, true);
    }

    fn register_temperature_units(&mut self) {
        use Category::Temperature;
        self.register("kelvin", Temperature, METRIC, true);
        self.register("celsius", Temperature, METRIC, false);
        self.register("fahrenheit", Temperature, US, false);
        self.register("rankine", Temperature, NONE, false);
    }

    fn register_amount_units(&mut self) {
        self.register("mole", Category::SubstanceAmount, ALL, true);
    }

    fn register_luminosity_units(&mut self) {
        self.register("candela", Category::LuminousIntensity, ALL, true);
    }

    fn register_angle_units(&mut self) {
        use Category::Angle;
        self.register("revolution", Angle, ALL, false);
        self.register("radian", Angle, ALL, true);
        self.register("degree", Angle, ALL, false);
        self.register("arc_minute", Angle, ALL, false);
        self.register("arc_second", Angle, ALL, false);
    }

    fn register_digital_units(&mut self) {
        self.register("bit", Category::Digital, ALL, true);
        self.register("byte", Category::Digital, ALL, true);
    }

    fn register_concentration_units(&mut self) {
        use Category::Concentration;
        self.register("portion", Concentration, ALL, false);
        self.register("percent", Concentration, ALL, false);
        self.register("permille", Concentration, ALL, false);
        self.register("permyriad", Concentration, ALL, false);
        self.register("permillion", Concentration, ALL, false);
        self.register("karat", Concentration, NONE, false);
    }

    fn register_area_units(&mut self) {
        use Category::Area;
        self.register("acre", Area, US_UK, false);
        self.register("hectare", Area, METRIC, false);
        self.register("dunam", Area, NONE, false);
    }

    fn register_volume_units(&mut self) {
        use Category::Volume;
        self.register("liter", Volume, METRIC, true);
        self.register("gallon", Volume, US, false);
        self.register("gallon_imperial", Volume, UK, false);
        self.register("quart", Volume, US, false);
        self.register("pint", Volume, US, false);
        self.register("cup", Volume, US, false);
        self.register("fluid_ounce", Volume, US, false);
        self.register("fluid_ounce_imperial", Volume, UK, false);
        self.register("tablespoon", Volume, US_UK, false);
        self.register("teaspoon", Volume, US_UK, false);
        self.register("barrel", Volume, US, false);
        self.register("bushel", Volume, US, false);
        self.register("pint_metric", Volume, METRIC, false);
        self.register("cup_metric", Volume, METRIC, false);
    }

    fn register_speed_units(&mut self) {
        self.register("knot", Category::Speed, ALL, false);
        self.register("beaufort", Category::Speed, NONE, false);
    }

    fn register_acceleration_units(&mut self) {
        self.register("g_force", Category::Acceleration, ALL, false);
    }

    fn register_force_units(&mut self) {
        use Category::Force;
        self.register("newton", Force, METRIC, true);
        self.register("pound_force", Force, US_UK, false);
        self.register("kilogram_force", Force, METRIC, false);
    }

    fn register_energy_units(&mut self) {
        use Category::Energy;
        self.register("joule", Energy, METRIC, true);
        self.register("calorie", Energy, ALL, true);
        self.register("foodcalorie", Energy, ALL, false);
        self.register("british_thermal_unit", Energy, US_UK, false);
        self.register("electronvolt", Energy, METRIC, true);
        self.register("therm_us", Energy, US, false);
    }

    fn register_power_units(&mut self) {
        self.register("watt", Category::Power, METRIC, true);
        self.register("horsepower", Category::Power, US_UK, false);
    }

    fn register_pressure_units(&mut self) {
        use Category::Pressure;
        self.register("pascal", Pressure, METRIC, true);
        self.register("bar", Pressure, METRIC, true);
        self.register("atmosphere", Pressure, ALL, false);
        self.register("inch_ofhg", Pressure, US_UK, false);
        self.register("meter_ofhg", Pressure, METRIC, true);
    }

    fn register_frequency_units(&mut self) {
        self.register("hertz", Category::Frequency, METRIC, true);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

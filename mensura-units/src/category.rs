//! Unit categories
//!
//! Categories are declared in canonical order: the declaration index is the
//! primary sort key of factors inside a compound unit. Derived categories come
//! first so that `kilowatt_hour` and `newton_meter` keep their familiar order;
//! the fundamental ones follow in the order their base units are written
//! (`kilogram_square_meter_per_square_second`).

use std::fmt;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Area,
    Volume,
    Speed,
    Acceleration,
    Force,
    Energy,
    Power,
    Pressure,
    Frequency,
    Consumption,
    MassDensity,
    Molarity,
    Voltage,
    Resistance,
    Mass,
    Length,
    Duration,
    ElectricCurrent,
    Temperature,
    SubstanceAmount,
    LuminousIntensity,
    Angle,
    Digital,
    Concentration,
}

impl Category {
    pub const ALL: [Category; 24] = [
        Category::Area,
        Category::Volume,
        Category::Speed,
        Category::Acceleration,
        Category::Force,
        Category::Energy,
        Category::Power,
        Category::Pressure,
        Category::Frequency,
        Category::Consumption,
        Category::MassDensity,
        Category::Molarity,
        Category::Voltage,
        Category::Resistance,
        Category::Mass,
        Category::Length,
        Category::Duration,
        Category::ElectricCurrent,
        Category::Temperature,
        Category::SubstanceAmount,
        Category::LuminousIntensity,
        Category::Angle,
        Category::Digital,
        Category::Concentration,
    ];

    /// Position in declaration order
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Area => "area",
            Category::Volume => "volume",
            Category::Speed => "speed",
            Category::Acceleration => "acceleration",
            Category::Force => "force",
            Category::Energy => "energy",
            Category::Power => "power",
            Category::Pressure => "pressure",
            Category::Frequency => "frequency",
            Category::Consumption => "consumption",
            Category::MassDensity => "mass_density",
            Category::Molarity => "molarity",
            Category::Voltage => "voltage",
            Category::Resistance => "resistance",
            Category::Mass => "mass",
            Category::Length => "length",
            Category::Duration => "duration",
            Category::ElectricCurrent => "electric_current",
            Category::Temperature => "temperature",
            Category::SubstanceAmount => "substance_amount",
            Category::LuminousIntensity => "luminous_intensity",
            Category::Angle => "angle",
            Category::Digital => "digital",
            Category::Concentration => "concentration",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Canonical name of the unit every conversion in this category targets
    pub fn base_unit(self) -> &'static str {
        match self {
            Category::Area => "square_meter",
            Category::Volume => "cubic_meter",
            Category::Speed => "meter_per_second",
            Category::Acceleration => "meter_per_square_second",
            Category::Force => "kilogram_meter_per_square_second",
            Category::Energy => "kilogram_square_meter_per_square_second",
            Category::Power => "kilogram_square_meter_per_cubic_second",
            Category::Pressure => "kilogram_per_meter_square_second",
            Category::Frequency => "revolution_per_second",
            Category::Consumption => "cubic_meter_per_meter",
            Category::MassDensity => "kilogram_per_cubic_meter",
            Category::Molarity => "mole_per_cubic_meter",
            Category::Voltage => "kilogram_square_meter_per_cubic_second_ampere",
            Category::Resistance => "kilogram_square_meter_per_cubic_second_square_ampere",
            Category::Mass => "kilogram",
            Category::Length => "meter",
            Category::Duration => "second",
            Category::ElectricCurrent => "ampere",
            Category::Temperature => "kelvin",
            Category::SubstanceAmount => "mole",
            Category::LuminousIntensity => "candela",
            Category::Angle => "revolution",
            Category::Digital => "bit",
            Category::Concentration => "portion",
        }
    }

    /// Whether units expressed in the inverse of the base belong here
    /// (`mile_per_gallon` is a consumption).
    pub fn allows_reciprocal(self) -> bool {
        matches!(self, Category::Consumption)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

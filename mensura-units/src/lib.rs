//! Mensura Units - Unit Algebra and Conversion
//!
//! Parses unit names into canonical compound units, derives a complete
//! conversion table from a small authored one, and converts values.
//!
//! Names follow the CLDR long-name grammar:
//! - Atoms: `meter`, `pound`, `nautical_mile`
//! - SI prefixes: `kilometer`, `millimeter_ofhg`
//! - Powers: `square_foot`, `cubic_meter`, `pow4_meter`
//! - Products and quotients: `kilowatt_hour`, `liter_per_100_kilometer`
//!
//! Conversions are exact rationals; a value keeps its numeric kind.

mod category;
mod prefix;
mod registry;
mod compound;
mod parse;
mod conversion;
mod derive;
mod convert;
mod quantity;

pub use category::Category;
pub use prefix::SiPrefix;
pub use registry::{REGISTRY, Registry, System, UnitId, AtomicUnit};
pub use compound::{CompoundUnit, Atom, Factor, category_base};
pub use parse::canonicalize;
pub use conversion::{BaseTable, Conversion, ConversionKind, SpecialConversion};
pub use derive::{ConversionTable, universe, embedded_universe, compounds_from_json};
pub use convert::{convert, convert_to, convert_to_base, category_of};
pub use quantity::Unit;

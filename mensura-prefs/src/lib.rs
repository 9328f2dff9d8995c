//! Mensura Prefs - Regional Unit Preferences
//!
//! Picks the units a value should be shown in for a usage (`person_height`,
//! `vehicle_fuel`, `weather`...) and a territory, and splits values over
//! mixed units such as feet and inches.

mod locale;
mod table;
mod resolve;

pub use locale::{Territory, territory_from_locale};
pub use table::{Preference, PreferenceTable};
pub use resolve::{PreferenceOptions, preferred_units, to_preferred_units, decompose};

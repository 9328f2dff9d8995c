//! Unit preference data
//!
//! Records are keyed by category and usage, then by scope, formality and
//! territory. Each holds ordered rows; a row of several units describes a
//! mixed decomposition such as `foot, inch`.

use std::collections::BTreeMap;
use serde::Deserialize;
use tracing::debug;
use mensura_core::{MensuraError, RBig, Result, parse_rational};
use mensura_units::{canonicalize, Category, CompoundUnit};
use crate::Territory;

/// Preferences shipped with the crate
const EMBEDDED_PREFERENCES: &str = include_str!("../data/preferences.json");

/// One preferred rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Preference {
    pub units: Vec<CompoundUnit>,
    /// Applies when the value, in the first unit, is at least this
    pub geq: Option<RBig>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RowKey {
    scope: Option<String>,
    alt: Option<String>,
    territory: Territory,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecord {
    category: Category,
    usage: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    alt: Option<String>,
    regions: Vec<String>,
    preferences: Vec<RawPreference>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPreference {
    units: Vec<String>,
    #[serde(default)]
    geq: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferenceTable {
    usages: BTreeMap<(Category, String), BTreeMap<RowKey, Vec<Preference>>>,
}

impl PreferenceTable {
    /// Decode a JSON array of records:
    /// `{category, usage, scope?, alt?, regions: [..], preferences: [{units, geq?}]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<RawRecord> = serde_json::from_str(json)
            .map_err(|e| MensuraError::Data(format!("preference table: {}", e)))?;

        let mut table = PreferenceTable::default();
        for record in records {
            let context = format!("{}/{}", record.category, record.usage);
            if record.preferences.is_empty() {
                return Err(MensuraError::Data(format!("preferences for {} are empty", context)));
            }

            let mut rows = Vec::with_capacity(record.preferences.len());
            for raw in record.preferences {
                if raw.units.is_empty() {
                    return Err(MensuraError::Data(format!("preference row for {} has no units", context)));
                }
                let units = raw.units.iter()
                    .map(|name| canonicalize(name))
                    .collect::<Result<Vec<_>>>()
                    .map_err(|e| MensuraError::Data(format!("preference for {}: {}", context, e)))?;
                let geq = raw.geq.as_deref()
                    .map(parse_rational)
                    .transpose()
                    .map_err(|e| MensuraError::Data(format!("threshold for {}: {}", context, e)))?;
                rows.push(Preference { units, geq });
            }

            let by_key = table.usages.entry((record.category, record.usage.to_lowercase())).or_default();
            for region in &record.regions {
                let territory = Territory::new(region)
                    .map_err(|e| MensuraError::Data(format!("region for {}: {}", context, e)))?;
                let key = RowKey {
                    scope: record.scope.as_deref().map(str::to_lowercase),
                    alt: record.alt.as_deref().map(str::to_lowercase),
                    territory,
                };
                if by_key.insert(key, rows.clone()).is_some() {
                    return Err(MensuraError::Data(format!(
                        "duplicate preferences for {} in {}", context, region
                    )));
                }
            }
        }

        debug!(usages = table.usages.len(), "loaded preference table");
        Ok(table)
    }

    /// The shipped preference data
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_PREFERENCES)
    }

    /// Rows stored under exactly this key
    pub fn rows(
        &self,
        category: Category,
        usage: &str,
        scope: Option<&str>,
        alt: Option<&str>,
        territory: &Territory,
    ) -> Option<&[Preference]> {
        let by_key = self.usages.get(&(category, usage.to_lowercase()))?;
        let key = RowKey {
            scope: scope.map(str::to_lowercase),
            alt: alt.map(str::to_lowercase),
            territory: territory.clone(),
        };
        by_key.get(&key).map(Vec::as_slice).filter(|rows| !rows.is_empty())
    }

    /// Usages with preferences for a category, sorted
    pub fn usages(&self, category: Category) -> Vec<&str> {
        self.usages.keys()
            .filter(|(c, _)| *c == category)
            .map(|(_, usage)| usage.as_str())
            .collect()
    }

    pub fn has_usage(&self, category: Category, usage: &str) -> bool {
        self.usages.contains_key(&(category, usage.to_lowercase()))
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }
}

//! Locale tags to territories
//!
//! Understands the subset of BCP-47 needed to pick a region:
//! `language[-script][-region][-variant...][-u-...]`. The `rg` keyword of the
//! `-u-` extension overrides the region (`en-US-u-rg-gbzzzz` is GB). A bare
//! language resolves through a small likely-subtags table, and anything not
//! covered falls back to the world.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use serde::{Serialize, Deserialize};
use tracing::debug;
use mensura_core::{MensuraError, Result};

/// A region code: two uppercase letters or three digits
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Territory(String);

impl Territory {
    /// The world region, used when nothing more specific applies
    pub const WORLD: &'static str = "001";

    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        if is_region(code) {
            Ok(Territory(code.to_uppercase()))
        } else {
            Err(MensuraError::locale(code, "territory must be two letters or three digits"))
        }
    }

    pub fn world() -> Self {
        Territory(Self::WORLD.to_string())
    }

    pub fn is_world(&self) -> bool {
        self.0 == Self::WORLD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Territory {
    fn default() -> Self {
        Territory::world()
    }
}

impl fmt::Display for Territory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Territory {
    type Error = MensuraError;

    fn try_from(code: String) -> Result<Self> {
        Territory::new(&code)
    }
}

impl From<Territory> for String {
    fn from(territory: Territory) -> String {
        territory.0
    }
}

/// Most likely region for a language (or language_script) with no region
static LIKELY_REGIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ar", "EG"), ("bg", "BG"), ("cs", "CZ"), ("da", "DK"), ("de", "DE"),
        ("el", "GR"), ("en", "US"), ("es", "ES"), ("et", "EE"), ("fa", "IR"),
        ("fi", "FI"), ("fr", "FR"), ("he", "IL"), ("hi", "IN"), ("hr", "HR"),
        ("hu", "HU"), ("id", "ID"), ("is", "IS"), ("it", "IT"), ("ja", "JP"),
        ("ko", "KR"), ("lt", "LT"), ("lv", "LV"), ("ms", "MY"), ("my", "MM"),
        ("nb", "NO"), ("nl", "NL"), ("no", "NO"), ("pl", "PL"), ("pt", "BR"),
        ("ro", "RO"), ("ru", "RU"), ("sk", "SK"), ("sl", "SI"), ("sr", "RS"),
        ("sv", "SE"), ("th", "TH"), ("tr", "TR"), ("uk", "UA"), ("vi", "VN"),
        ("zh", "CN"), ("zh_hans", "CN"), ("zh_hant", "TW"),
    ])
});

/// Subtags of a parsed tag that matter for territory selection
#[derive(Debug, Default)]
struct LocaleTag {
    language: String,
    script: Option<String>,
    region: Option<String>,
    region_override: Option<String>,
}

/// Resolve the territory a locale's unit preferences come from
pub fn territory_from_locale(tag: &str) -> Result<Territory> {
    let parsed = parse_tag(tag)?;

    if let Some(region) = parsed.region_override.or(parsed.region) {
        return Territory::new(&region);
    }

    let likely = parsed.script.as_ref()
        .and_then(|script| LIKELY_REGIONS.get(format!("{}_{}", parsed.language, script).as_str()))
        .or_else(|| LIKELY_REGIONS.get(parsed.language.as_str()));
    match likely {
        Some(region) => Ok(Territory(region.to_string())),
        None => {
            debug!(tag, language = parsed.language.as_str(), "no likely region, using world");
            Ok(Territory::world())
        }
    }
}

fn parse_tag(tag: &str) -> Result<LocaleTag> {
    let normalized = tag.trim().to_lowercase().replace('_', "-");
    let mut subtags = normalized.split('-');

    let language = subtags.next().unwrap_or_default();
    if !(2..=8).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(MensuraError::locale(tag, "missing or malformed language subtag"));
    }

    let mut parsed = LocaleTag { language: language.to_string(), ..LocaleTag::default() };
    let mut position = 0;

    while let Some(subtag) = subtags.next() {
        if subtag.is_empty() || !subtag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(MensuraError::locale(tag, format!("malformed subtag '{}'", subtag)));
        }
        match subtag.len() {
            // extensions and private use run to the end of the tag
            1 => {
                if subtag == "u" {
                    parsed.region_override = unicode_region(&mut subtags, tag)?;
                }
                break;
            }
            4 if position < 1 && subtag.chars().all(|c| c.is_ascii_alphabetic()) => {
                parsed.script = Some(subtag.to_string());
                position = 1;
            }
            2 | 3 if position < 2 && is_region(subtag) => {
                parsed.region = Some(subtag.to_uppercase());
                position = 2;
            }
            4..=8 => position = 3,
            _ => return Err(MensuraError::locale(tag, format!("unexpected subtag '{}'", subtag))),
        }
    }

    Ok(parsed)
}

/// The region named by `rg` in a `-u-` extension, if any
fn unicode_region<'a>(subtags: &mut impl Iterator<Item = &'a str>, tag: &str) -> Result<Option<String>> {
    while let Some(key) = subtags.next() {
        if key.len() == 1 {
            break;
        }
        if key != "rg" {
            continue;
        }
        let value = subtags.next()
            .ok_or_else(|| MensuraError::locale(tag, "rg keyword without a value"))?;
        let region = value.strip_suffix("zzzz").filter(|r| is_region(r))
            .ok_or_else(|| MensuraError::locale(tag, format!("malformed rg value '{}'", value)))?;
        return Ok(Some(region.to_uppercase()));
    }
    Ok(None)
}

fn is_region(code: &str) -> bool {
    (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
        || (code.len() == 3 && code.chars().all(|c| c.is_ascii_digit()))
}

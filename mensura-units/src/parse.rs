//! Unit name parsing - canonicalize names like "kilometer-per-hour" or "pow4_meter"

use std::collections::HashMap;
use mensura_core::{MensuraError, Result, UBig, MAX_EXPONENT};
use crate::{CompoundUnit, SiPrefix};
use crate::compound::{Atom, Factor};
use crate::registry::{UnitId, REGISTRY};

/// Parse a unit name into its canonical compound unit
///
/// Supported forms:
/// - Atoms: "meter", "nautical_mile"
/// - SI prefixes: "kilometer", "millimeter_ofhg"
/// - Powers: "square_meter", "cubic_foot", "pow4_meter"
/// - Products: "kilowatt_hour", "100_kilometer"
/// - Quotients: "meter_per_second", "per_second"
/// - Currencies: "curr_usd_per_gallon"
pub fn canonicalize(raw: &str) -> Result<CompoundUnit> {
    let name = normalize_name(raw);
    if name.is_empty() {
        return Err(MensuraError::invalid_name(raw, "empty unit name"));
    }

    let (numerator, denominator) = split_per(&name)?;
    let numerator = match numerator {
        Some(stream) => parse_group(stream, &name)?,
        None => Vec::new(),
    };
    let denominator = match denominator {
        Some(stream) => parse_group(stream, &name)?,
        None => Vec::new(),
    };

    Ok(CompoundUnit::new(numerator, denominator))
}

/// Case and separator folding applied before parsing
pub(crate) fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace('-', "_")
}

/// Split on the single `_per_` boundary. A leading `per_` leaves the
/// numerator empty.
fn split_per(name: &str) -> Result<(Option<&str>, Option<&str>)> {
    if let Some(rest) = name.strip_prefix("per_") {
        if rest.contains("_per_") {
            return Err(MensuraError::invalid_name(name, "more than one '_per_'"));
        }
        return Ok((None, Some(rest)));
    }

    let parts: Vec<&str> = name.split("_per_").collect();
    match parts.as_slice() {
        [whole] => Ok((Some(*whole), None)),
        [numerator, denominator] => Ok((Some(*numerator), Some(*denominator))),
        _ => Err(MensuraError::invalid_name(name, "more than one '_per_'")),
    }
}

fn parse_group(stream: &str, name: &str) -> Result<Vec<Factor>> {
    let tokens: Vec<&str> = stream.split('_').collect();
    if tokens.iter().any(|t| t.is_empty()) {
        return Err(MensuraError::invalid_name(name, "empty segment"));
    }

    let mut factors = Vec::new();
    let mut pending: Option<i32> = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];

        if let Some(exp) = power_prefix(token, name)? {
            if pending.is_some() {
                return Err(MensuraError::invalid_name(name, "repeated power prefix"));
            }
            pending = Some(exp);
            i += 1;
            continue;
        }

        let exponent = pending.take().unwrap_or(1);

        if let Some(n) = numeric_literal(token, name)? {
            factors.push(Factor::new(None, Atom::Numeric(n), exponent));
            i += 1;
            continue;
        }

        if token == "curr" {
            let code = tokens.get(i + 1)
                .filter(|c| c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
                .ok_or_else(|| MensuraError::UnknownUnit(token.to_string()))?;
            factors.push(Factor::new(None, Atom::Currency(code.to_uppercase()), exponent));
            i += 2;
            continue;
        }

        let (prefix, id, consumed) = longest_match(&tokens[i..])
            .ok_or_else(|| MensuraError::UnknownUnit(token.to_string()))?;
        factors.push(Factor::new(prefix, Atom::Known(id), exponent));
        i += consumed;
    }

    if pending.is_some() {
        return Err(MensuraError::invalid_name(name, "power prefix not followed by a unit"));
    }

    // repeated factors collapse into one exponent, which must still be an i32
    let mut totals: HashMap<(Option<SiPrefix>, &Atom), i64> = HashMap::new();
    for factor in &factors {
        let total = totals.entry((factor.prefix, &factor.atom)).or_insert(0);
        *total += i64::from(factor.exponent);
        if i32::try_from(*total).is_err() {
            return Err(MensuraError::invalid_name(name, "combined power too large"));
        }
    }

    Ok(factors)
}

/// `square` -> 2, `cubic` -> 3, `powN` -> N
fn power_prefix(token: &str, name: &str) -> Result<Option<i32>> {
    match token {
        "square" => return Ok(Some(2)),
        "cubic" => return Ok(Some(3)),
        _ => {}
    }

    let digits = match token.strip_prefix("pow") {
        Some(d) if !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()) => d,
        _ => return Ok(None),
    };
    match digits.parse::<i32>() {
        Ok(n) if n >= 2 => Ok(Some(n)),
        Ok(_) => Err(MensuraError::invalid_name(name, format!("power '{}' below pow2", token))),
        Err(_) => Err(MensuraError::invalid_name(name, format!("power '{}' too large", token))),
    }
}

/// Digits, or `1eN` for a power of ten
fn numeric_literal(token: &str, name: &str) -> Result<Option<UBig>> {
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    let value = if all_digits(token) {
        token.parse::<UBig>()
            .map_err(|_| MensuraError::invalid_name(name, format!("bad number '{}'", token)))?
    } else if let Some(exp) = token.strip_prefix("1e").filter(|e| all_digits(e)) {
        let exp = exp.parse::<u32>().ok()
            .filter(|e| *e <= MAX_EXPONENT)
            .ok_or_else(|| MensuraError::invalid_name(name, format!("number '{}' too large", token)))?;
        UBig::from(10u8).pow(exp as usize)
    } else {
        return Ok(None);
    };

    if value == UBig::ZERO {
        return Err(MensuraError::invalid_name(name, "numeric unit must be at least 1"));
    }
    Ok(Some(value))
}

/// Greedy longest run of tokens naming an atom, bare or SI-prefixed
fn longest_match(tokens: &[&str]) -> Option<(Option<SiPrefix>, UnitId, usize)> {
    (1..=tokens.len()).rev().find_map(|len| {
        let candidate = tokens[..len].join("_");
        if let Some(id) = REGISTRY.get(&candidate) {
            return Some((None, id, len));
        }
        let (prefix, rest) = SiPrefix::strip(&candidate)?;
        let id = REGISTRY.get(rest)?;
        if REGISTRY.atom(id).prefixable {
            Some((Some(prefix), id, len))
        } else {
            None
        }
    })
}

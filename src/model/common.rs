//! Serde helpers for the Graph API's loose number encoding.
//!
//! Monetary amounts and most insight metrics arrive as decimal strings
//! (`"12.34"`), while a few fields are plain JSON numbers. These helpers
//! accept both.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
}

/// Reads a string-or-number field as `f64`. Missing, null and empty
/// values become `0.0`.
pub fn loose_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Loose::Number(n)) => Ok(n),
        Some(Loose::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Loose::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Reads a string-or-number count as `u64`, truncating any fraction.
pub fn loose_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = loose_f64(deserializer)?;
    if value < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative count, got {}",
            value
        )));
    }
    Ok(value as u64)
}

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for Graph object IDs with phantom types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// How a kind of Graph object spells its ID.
pub trait IdKind {
    /// Human-readable name used in validation messages.
    const LABEL: &'static str;

    /// Normalizes raw input into the form the Graph API expects.
    fn normalize(input: &str) -> Result<String, String> {
        normalize_numeric(input)
    }
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdAccountMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CampaignMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotoMarker;

impl IdKind for AdAccountMarker {
    const LABEL: &'static str = "ad account";

    /// Ad accounts are addressed as `act_<number>`; a bare number is accepted.
    fn normalize(input: &str) -> Result<String, String> {
        let digits = input.strip_prefix("act_").unwrap_or(input);
        let digits = normalize_numeric(digits)?;
        Ok(format!("act_{}", digits))
    }
}

impl IdKind for CampaignMarker {
    const LABEL: &'static str = "campaign";
}

impl IdKind for PageMarker {
    const LABEL: &'static str = "page";
}

impl IdKind for PhotoMarker {
    const LABEL: &'static str = "photo";
}

/// Type aliases for specific ID types
pub type AdAccountId = Id<AdAccountMarker>;
pub type CampaignId = Id<CampaignMarker>;
pub type PageId = Id<PageMarker>;
pub type PhotoId = Id<PhotoMarker>;

impl<T: IdKind> Id<T> {
    /// Parse and normalize an ID of this kind
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = T::normalize(input.trim()).map_err(|reason| ValidationError::InvalidId {
            kind: T::LABEL,
            input: input.to_string(),
            reason,
        })?;
        Ok(Self {
            value,
            _phantom: PhantomData,
        })
    }
}

impl<T> Id<T> {
    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T: IdKind> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// Graph object IDs are digit runs, optionally joined by underscores
/// (`<page>_<post>` for feed items).
fn normalize_numeric(input: &str) -> Result<String, String> {
    if input.is_empty() {
        return Err("ID cannot be empty".to_string());
    }
    if input.starts_with('_') || input.ends_with('_') {
        return Err("ID cannot start or end with '_'".to_string());
    }
    if let Some(bad) = input.chars().find(|c| !c.is_ascii_digit() && *c != '_') {
        return Err(format!("unexpected character '{}'", bad));
    }
    Ok(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ad_account_normalization() {
        let bare = AdAccountId::parse("1234567890").unwrap();
        assert_eq!(bare.as_str(), "act_1234567890");

        let prefixed = AdAccountId::parse(" act_1234567890 ").unwrap();
        assert_eq!(prefixed, bare);
    }

    #[test]
    fn test_numeric_ids() {
        assert_eq!(CampaignId::parse("23851234").unwrap().as_str(), "23851234");
        assert_eq!(PageId::parse("1029_3847").unwrap().as_str(), "1029_3847");
    }

    #[test]
    fn test_invalid_ids() {
        assert!(CampaignId::parse("").is_err());
        assert!(CampaignId::parse("abc123").is_err());
        assert!(PageId::parse("_123").is_err());
        assert!(AdAccountId::parse("act_").is_err());
        assert!(AdAccountId::parse("act_12x").is_err());
    }

    #[test]
    fn test_error_names_the_kind() {
        let err = PhotoId::parse("nope").unwrap_err();
        assert!(err.to_string().starts_with("Invalid photo ID: nope"));
    }

    #[test]
    fn test_deserialize_validates() {
        let id: CampaignId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(id.as_str(), "42");
        assert!(serde_json::from_str::<CampaignId>("\"forty-two\"").is_err());
    }
}

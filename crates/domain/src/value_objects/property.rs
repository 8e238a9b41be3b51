//! Property configuration value objects
//!
//! These identify the publisher property a consent message is served for and
//! steer which campaign the consent service selects.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum length for a property name
const MAX_PROPERTY_NAME_LENGTH: usize = 255;

const HTTPS_SCHEME: &str = "https://";

// ============================================================================
// PropertyName
// ============================================================================

/// A validated property name (non-empty, <=255 chars, `[a-zA-Z0-9.:/-]` only)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyName(String);

impl PropertyName {
    /// Create a new validated property name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The name is empty after trimming
    /// - The name exceeds 255 characters
    /// - The name contains characters outside `[a-zA-Z0-9.:/-]`
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Property name cannot be empty"));
        }
        if trimmed.len() > MAX_PROPERTY_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Property name cannot exceed {} characters",
                MAX_PROPERTY_NAME_LENGTH
            )));
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '/' | '-')))
        {
            return Err(DomainError::validation(format!(
                "Property name contains invalid character '{}': {}",
                c, trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The property as an href, prefixed with `https://` unless a scheme is present.
    pub fn href(&self) -> String {
        if self.0.contains("://") {
            self.0.clone()
        } else {
            format!("{}{}", HTTPS_SCHEME, self.0)
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PropertyName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PropertyName> for String {
    fn from(name: PropertyName) -> String {
        name.0
    }
}

// ============================================================================
// CampaignEnv
// ============================================================================

/// Content pipeline the consent service serves campaigns from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CampaignEnv {
    Stage,
    #[default]
    Public,
}

impl CampaignEnv {
    /// Value of the `campaignEnv` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignEnv::Stage => "stage",
            CampaignEnv::Public => "prod",
        }
    }
}

impl fmt::Display for CampaignEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignEnv {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stage" => Ok(CampaignEnv::Stage),
            "prod" | "public" => Ok(CampaignEnv::Public),
            other => Err(DomainError::parse(format!(
                "Unknown campaign environment: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// TargetingParams
// ============================================================================

/// Caller-supplied key/value hints forwarded verbatim to the consent service.
///
/// Backed by an ordered map so the JSON form is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetingParams(BTreeMap<String, String>);

impl TargetingParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<HashMap<String, String>> for TargetingParams {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for TargetingParams {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TargetingParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_name_valid() {
        let name = PropertyName::new("  twosdks.demo  ").unwrap();
        assert_eq!(name.as_str(), "twosdks.demo");
        assert_eq!(name.href(), "https://twosdks.demo");
    }

    #[test]
    fn test_property_name_keeps_existing_scheme() {
        let name = PropertyName::new("http://localhost:8080").unwrap();
        assert_eq!(name.href(), "http://localhost:8080");
    }

    #[test]
    fn test_property_name_empty_rejected() {
        assert!(matches!(
            PropertyName::new("   "),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_property_name_invalid_characters_rejected() {
        let err = PropertyName::new("my site?.com").unwrap_err();
        assert!(err.to_string().contains("invalid character"));
    }

    #[test]
    fn test_property_name_too_long_rejected() {
        assert!(PropertyName::new("a".repeat(256)).is_err());
    }

    #[test]
    fn test_property_name_deserialize_validates() {
        assert!(serde_json::from_str::<PropertyName>("\"bad name\"").is_err());
        let ok: PropertyName = serde_json::from_str("\"site.com\"").unwrap();
        assert_eq!(ok.as_str(), "site.com");
    }

    #[test]
    fn test_campaign_env_query_values() {
        assert_eq!(CampaignEnv::Stage.as_str(), "stage");
        assert_eq!(CampaignEnv::Public.as_str(), "prod");
        assert_eq!("public".parse::<CampaignEnv>().unwrap(), CampaignEnv::Public);
        assert_eq!("PROD".parse::<CampaignEnv>().unwrap(), CampaignEnv::Public);
        assert_eq!("stage".parse::<CampaignEnv>().unwrap(), CampaignEnv::Stage);
        assert!("qa".parse::<CampaignEnv>().is_err());
    }

    #[test]
    fn test_targeting_params_empty_serializes_to_object() {
        let params = TargetingParams::new();
        assert_eq!(serde_json::to_string(&params).unwrap(), "{}");
    }

    #[test]
    fn test_targeting_params_from_iterator() {
        let params: TargetingParams = [("SDK_TYPE", "CCPA"), ("a", "b")].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("SDK_TYPE"), Some("CCPA"));
    }
}

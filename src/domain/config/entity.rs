//! Configuration snapshot entities

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Label used to select a subset of configuration settings
///
/// Always non-empty. The value is kept exactly as given, so `" prod"` and
/// `"prod"` select different settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelFilter(String);

impl LabelFilter {
    /// Creates a label filter, rejecting empty input
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::validation("Missing label filter"));
        }

        Ok(Self(value))
    }

    /// Builds a label filter from an optional request parameter
    pub fn from_param(value: Option<&str>) -> Result<Self, DomainError> {
        match value {
            Some(v) => Self::new(v),
            None => Err(DomainError::validation("Missing label filter")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LabelFilter {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Raw key-value record as held by the authoritative store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSetting {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl ConfigSetting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            value: Some(value.into()),
            content_type: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
impl ConfigSetting {
    /// Setting stored without a value
    pub fn without_value(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            value: None,
            content_type: None,
        }
    }
}

/// Normalized value served to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// `enabled` state of a feature flag
    Flag(bool),
    Text(String),
    /// Setting present in the store with no value; serialized as `null`
    Empty,
}

/// Full answer for one label at one point in time
///
/// Keys are kept ordered so that two snapshots with the same content always
/// serialize to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Serializes the snapshot into the JSON object used for responses and the cache
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::internal(format!("Failed to serialize snapshot: {}", e)))
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

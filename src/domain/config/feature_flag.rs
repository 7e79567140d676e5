//! Feature flag key convention and value normalization

use serde::Deserialize;

use super::{ConfigSetting, ConfigSnapshot, ConfigValue};
use crate::domain::DomainError;

/// Marker App Configuration places in every feature flag key
pub const DEFAULT_FEATURE_FLAG_MARKER: &str = ".appconfig.featureflag/";

/// Recognizes feature flag keys and reduces their payload to the `enabled` state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlagConvention {
    marker: String,
}

impl Default for FeatureFlagConvention {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURE_FLAG_MARKER)
    }
}

#[derive(Deserialize)]
struct FlagPayload {
    enabled: bool,
}

impl FeatureFlagConvention {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn is_feature_flag(&self, key: &str) -> bool {
        !self.marker.is_empty() && key.contains(&self.marker)
    }

    /// Normalizes a single setting into the value served to clients
    pub fn normalize(&self, setting: &ConfigSetting) -> Result<ConfigValue, DomainError> {
        if !self.is_feature_flag(&setting.key) {
            return Ok(match &setting.value {
                Some(value) => ConfigValue::Text(value.clone()),
                None => ConfigValue::Empty,
            });
        }

        let raw = setting.value.as_deref().ok_or_else(|| {
            DomainError::internal(format!("Feature flag '{}' has no value", setting.key))
        })?;

        let payload: FlagPayload = serde_json::from_str(raw).map_err(|e| {
            DomainError::internal(format!(
                "Malformed feature flag '{}': {}",
                setting.key, e
            ))
        })?;

        Ok(ConfigValue::Flag(payload.enabled))
    }

    /// Builds a snapshot from raw settings; later duplicates of a key win
    pub fn snapshot<'a, I>(&self, settings: I) -> Result<ConfigSnapshot, DomainError>
    where
        I: IntoIterator<Item = &'a ConfigSetting>,
    {
        settings
            .into_iter()
            .map(|setting| Ok((setting.key.clone(), self.normalize(setting)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAG_KEY: &str = "myapp.appconfig.featureflag/featureB";

    #[test]
    fn test_is_feature_flag() {
        let convention = FeatureFlagConvention::default();

        assert!(convention.is_feature_flag(FLAG_KEY));
        assert!(convention.is_feature_flag(".appconfig.featureflag/beta"));
        assert!(!convention.is_feature_flag("featureA"));
        assert!(!convention.is_feature_flag("appconfig.featureflag"));
    }

    #[test]
    fn test_empty_marker_matches_nothing() {
        let convention = FeatureFlagConvention::new("");
        assert!(!convention.is_feature_flag(FLAG_KEY));
    }

    #[test]
    fn test_plain_setting_passes_through() {
        let convention = FeatureFlagConvention::default();
        let value = convention
            .normalize(&ConfigSetting::new("featureA", "{\"enabled\": true}"))
            .unwrap();

        assert_eq!(value, ConfigValue::Text("{\"enabled\": true}".to_string()));
    }

    #[test]
    fn test_setting_without_value() {
        let convention = FeatureFlagConvention::default();
        let value = convention
            .normalize(&ConfigSetting::without_value("empty"))
            .unwrap();

        assert_eq!(value, ConfigValue::Empty);
    }

    #[test]
    fn test_flag_extracts_enabled() {
        let convention = FeatureFlagConvention::default();
        let payload = r#"{"id":"featureB","enabled":false,"conditions":{"client_filters":[]}}"#;

        let value = convention
            .normalize(&ConfigSetting::new(FLAG_KEY, payload))
            .unwrap();

        assert_eq!(value, ConfigValue::Flag(false));
    }

    #[test]
    fn test_malformed_flag_is_error() {
        let convention = FeatureFlagConvention::default();

        for payload in ["not json", "{\"id\":\"x\"}", "{\"enabled\":\"yes\"}", "true"] {
            let result = convention.normalize(&ConfigSetting::new(FLAG_KEY, payload));
            assert!(
                matches!(result, Err(DomainError::Internal { .. })),
                "payload {payload} should be rejected"
            );
        }

        let result = convention.normalize(&ConfigSetting::without_value(FLAG_KEY));
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }

    #[test]
    fn test_snapshot_from_settings() {
        let convention = FeatureFlagConvention::default();
        let settings = vec![
            ConfigSetting::new("featureA", "on"),
            ConfigSetting::new(FLAG_KEY, "{\"enabled\": true}"),
        ];

        let snapshot = convention.snapshot(&settings).unwrap();

        assert_eq!(
            snapshot.to_json().unwrap(),
            r#"{"featureA":"on","myapp.appconfig.featureflag/featureB":true}"#
        );
    }

    #[test]
    fn test_snapshot_last_duplicate_wins() {
        let convention = FeatureFlagConvention::default();
        let settings = vec![
            ConfigSetting::new("key", "first"),
            ConfigSetting::new("key", "second"),
        ];

        let snapshot = convention.snapshot(&settings).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("key"), Some(&ConfigValue::Text("second".to_string())));
    }

    #[test]
    fn test_snapshot_fails_on_single_bad_flag() {
        let convention = FeatureFlagConvention::default();
        let settings = vec![
            ConfigSetting::new("featureA", "on"),
            ConfigSetting::new(FLAG_KEY, "{"),
        ];

        assert!(convention.snapshot(&settings).is_err());
    }
}

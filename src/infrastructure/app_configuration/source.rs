//! Snapshot source built on a settings store

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::domain::config::{
    ConfigSnapshot, ConfigSource, FeatureFlagConvention, LabelFilter, SettingsStore,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_source_fetch;

/// Lists a label's settings and normalizes them into a snapshot
#[derive(Clone)]
pub struct NormalizingConfigSource {
    store: Arc<dyn SettingsStore>,
    convention: FeatureFlagConvention,
}

impl std::fmt::Debug for NormalizingConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizingConfigSource")
            .field("store", &self.store.name())
            .field("convention", &self.convention)
            .finish()
    }
}

impl NormalizingConfigSource {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            convention: FeatureFlagConvention::default(),
        }
    }

    pub fn with_convention(mut self, convention: FeatureFlagConvention) -> Self {
        self.convention = convention;
        self
    }
}

#[async_trait]
impl ConfigSource for NormalizingConfigSource {
    async fn fetch(&self, label: &LabelFilter) -> Result<ConfigSnapshot, DomainError> {
        let start = Instant::now();
        let result = self.store.list_settings(label).await;
        record_source_fetch(self.store.name(), result.is_ok(), start.elapsed());

        let settings = result.inspect_err(|e| {
            error!(store = self.store.name(), label = %label, error = %e, "Failed to list settings");
        })?;

        let snapshot = self.convention.snapshot(&settings)?;

        debug!(
            store = self.store.name(),
            label = %label,
            keys = snapshot.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched config snapshot"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{ConfigSetting, ConfigValue, MockSettingsStore};
    use mockall::predicate::*;

    fn label(value: &str) -> LabelFilter {
        LabelFilter::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_normalizes_flags() {
        let mut store = MockSettingsStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_list_settings()
            .with(eq(label("prod")))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    ConfigSetting::new("featureA", "on").with_label("prod"),
                    ConfigSetting::new(
                        "myapp.appconfig.featureflag/featureB",
                        r#"{"id":"featureB","enabled":true}"#,
                    )
                    .with_label("prod"),
                ])
            });

        let source = NormalizingConfigSource::new(Arc::new(store));
        let snapshot = source.fetch(&label("prod")).await.unwrap();

        assert_eq!(
            snapshot.get("featureA"),
            Some(&ConfigValue::Text("on".to_string()))
        );
        assert_eq!(
            snapshot.get("myapp.appconfig.featureflag/featureB"),
            Some(&ConfigValue::Flag(true))
        );
    }

    #[tokio::test]
    async fn test_fetch_empty_label() {
        let mut store = MockSettingsStore::new();
        store.expect_name().return_const("mock");
        store.expect_list_settings().returning(|_| Ok(vec![]));

        let source = NormalizingConfigSource::new(Arc::new(store));

        assert!(source.fetch(&label("none")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_propagates_store_error() {
        let mut store = MockSettingsStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_list_settings()
            .returning(|_| Err(DomainError::store("mock", "timeout")));

        let source = NormalizingConfigSource::new(Arc::new(store));

        assert!(matches!(
            source.fetch(&label("prod")).await,
            Err(DomainError::Store { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_flag() {
        let mut store = MockSettingsStore::new();
        store.expect_name().return_const("mock");
        store.expect_list_settings().returning(|_| {
            Ok(vec![ConfigSetting::new(".appconfig.featureflag/x", "oops")])
        });

        let source = NormalizingConfigSource::new(Arc::new(store));

        assert!(matches!(
            source.fetch(&label("prod")).await,
            Err(DomainError::Internal { .. })
        ));
    }

    #[tokio::test]
    async fn test_custom_marker() {
        let mut store = MockSettingsStore::new();
        store.expect_name().return_const("mock");
        store.expect_list_settings().returning(|_| {
            Ok(vec![ConfigSetting::new("flags/beta", r#"{"enabled":false}"#)])
        });

        let source = NormalizingConfigSource::new(Arc::new(store))
            .with_convention(FeatureFlagConvention::new("flags/"));
        let snapshot = source.fetch(&label("prod")).await.unwrap();

        assert_eq!(snapshot.get("flags/beta"), Some(&ConfigValue::Flag(false)));
    }
}

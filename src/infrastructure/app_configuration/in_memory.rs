//! In-memory settings store

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::config::{ConfigSetting, LabelFilter, SettingsStore};
use crate::domain::DomainError;

/// Settings store kept in process memory
///
/// Matches labels exactly. Only compiled for tests, where it stands in for
/// App Configuration and the fetch counter shows whether a request reached
/// the store or was answered from the cache.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<Vec<ConfigSetting>>,
    fetches: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Vec<ConfigSetting>) -> Self {
        Self {
            settings: RwLock::new(settings),
            ..Default::default()
        }
    }

    pub async fn insert(&self, setting: ConfigSetting) {
        self.settings.write().await.push(setting);
    }

    /// Replaces every setting carrying `label` with the given ones
    pub async fn replace_label(&self, label: &str, settings: Vec<ConfigSetting>) {
        let mut guard = self.settings.write().await;
        guard.retain(|s| s.label.as_deref() != Some(label));
        guard.extend(settings);
    }

    /// Makes subsequent listings fail as if the store were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of listings served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    async fn list_settings(&self, label: &LabelFilter) -> Result<Vec<ConfigSetting>, DomainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::store(self.name(), "Store unavailable"));
        }

        let settings = self.settings.read().await;
        Ok(settings
            .iter()
            .filter(|s| s.label.as_deref() == Some(label.as_str()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(value: &str) -> LabelFilter {
        LabelFilter::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_filters_by_exact_label() {
        let store = InMemorySettingsStore::with_settings(vec![
            ConfigSetting::new("a", "1").with_label("prod"),
            ConfigSetting::new("b", "2").with_label("dev"),
            ConfigSetting::new("c", "3"),
        ]);

        let settings = store.list_settings(&label("prod")).await.unwrap();

        assert_eq!(settings, vec![ConfigSetting::new("a", "1").with_label("prod")]);
        assert!(store.list_settings(&label("prod*")).await.unwrap().is_empty());
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_replace_label() {
        let store = InMemorySettingsStore::new();
        store.insert(ConfigSetting::new("a", "1").with_label("prod")).await;
        store.insert(ConfigSetting::new("b", "1").with_label("dev")).await;

        store
            .replace_label("prod", vec![ConfigSetting::new("a", "2").with_label("prod")])
            .await;

        let prod = store.list_settings(&label("prod")).await.unwrap();
        assert_eq!(prod[0].value.as_deref(), Some("2"));
        assert_eq!(store.list_settings(&label("dev")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = InMemorySettingsStore::new();
        store.set_unavailable(true);

        let result = store.list_settings(&label("prod")).await;
        assert!(matches!(result, Err(DomainError::Store { .. })));

        store.set_unavailable(false);
        assert!(store.list_settings(&label("prod")).await.is_ok());
    }
}

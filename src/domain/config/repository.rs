//! Capabilities exposed by the authoritative configuration store

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{ConfigSetting, ConfigSnapshot, LabelFilter};
use crate::domain::error::DomainError;

/// Raw access to the store: every setting carrying the given label
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Short name used in logs, metrics and errors
    fn name(&self) -> &'static str;

    /// Lists every setting whose label equals the filter
    async fn list_settings(&self, label: &LabelFilter) -> Result<Vec<ConfigSetting>, DomainError>;
}

/// Normalized view of the store consumed by the read-through handler
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetches the current snapshot for a label; empty when nothing matches
    async fn fetch(&self, label: &LabelFilter) -> Result<ConfigSnapshot, DomainError>;
}

//! Cache key derivation for configuration snapshots

use std::fmt;

use crate::domain::config::LabelFilter;

/// Namespace prepended to every snapshot key
pub const DEFAULT_KEY_NAMESPACE: &str = "config";

/// Key under which one label's snapshot is cached
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives cache keys as `<namespace>:<label>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyGenerator {
    namespace: String,
}

impl Default for CacheKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_NAMESPACE)
    }
}

impl CacheKeyGenerator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Generates the key for a label
    pub fn generate(&self, label: &LabelFilter) -> CacheKey {
        CacheKey(format!("{}:{}", self.namespace, label.as_str()))
    }
}

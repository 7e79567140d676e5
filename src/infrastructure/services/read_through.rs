//! Read-through configuration handler

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::cache::{CacheKeyGenerator, CacheLookup};
use crate::domain::config::{ConfigSource, LabelFilter};
use crate::domain::DomainError;
use crate::infrastructure::cache::FailSafeCache;

/// Where a payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOrigin {
    Cache,
    Source,
}

impl PayloadOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Source => "source",
        }
    }
}

/// Serialized snapshot returned to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPayload {
    /// JSON object, returned byte for byte
    pub body: String,
    pub origin: PayloadOrigin,
}

/// Serves label snapshots from the cache, falling back to the source
///
/// A cache that is down or misbehaving only costs latency: lookups and
/// writes go through [`FailSafeCache`], so every failure there degrades to
/// a source fetch. Empty snapshots are never cached.
#[derive(Clone)]
pub struct ReadThroughHandler {
    source: Arc<dyn ConfigSource>,
    cache: FailSafeCache,
    keys: CacheKeyGenerator,
}

impl std::fmt::Debug for ReadThroughHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadThroughHandler")
            .field("cache", &self.cache)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl ReadThroughHandler {
    pub fn new(source: Arc<dyn ConfigSource>, cache: FailSafeCache, keys: CacheKeyGenerator) -> Self {
        Self { source, cache, keys }
    }

    pub fn cache(&self) -> &FailSafeCache {
        &self.cache
    }

    /// Resolves the snapshot for a raw `label_filter` parameter
    ///
    /// Fails with `Validation` when the label is missing or empty,
    /// `NotFound` when the source has no setting for it, and propagates
    /// source and normalization errors unchanged.
    #[instrument(skip(self))]
    pub async fn handle(&self, label: Option<&str>) -> Result<ConfigPayload, DomainError> {
        let label = LabelFilter::from_param(label)?;
        let key = self.keys.generate(&label);

        if let CacheLookup::Hit(body) = self.cache.lookup(&key).await {
            return Ok(ConfigPayload {
                body,
                origin: PayloadOrigin::Cache,
            });
        }

        let snapshot = self.source.fetch(&label).await?;

        if snapshot.is_empty() {
            debug!(label = %label, "No settings for label");
            return Err(DomainError::not_found("No config settings found"));
        }

        let body = snapshot.to_json()?;

        // Outcome is logged and counted by the cache wrapper
        let _ = self.cache.store(&key, &body).await;

        info!(label = %label, keys = snapshot.len(), "Served config from source");

        Ok(ConfigPayload {
            body,
            origin: PayloadOrigin::Source,
        })
    }
}

//! Failure-isolating wrapper around a cache backend

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::cache::{Cache, CacheKey, CacheLookup, CacheWrite};
use crate::infrastructure::observability::{record_cache_lookup, record_cache_write};

use super::factory::CacheWriteMode;

/// Cache access that never fails
///
/// Backend errors are converted into [`CacheLookup::Unavailable`] and
/// [`CacheWrite::Unavailable`], logged and counted, so a caller can tell an
/// absent key from an unreachable backend without having to handle errors.
#[derive(Debug, Clone)]
pub struct FailSafeCache {
    inner: Arc<dyn Cache>,
    ttl: Duration,
    write_mode: CacheWriteMode,
}

impl FailSafeCache {
    pub fn new(inner: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            write_mode: CacheWriteMode::default(),
        }
    }

    pub fn with_write_mode(mut self, write_mode: CacheWriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    /// Reads a key; never propagates backend errors
    pub async fn lookup(&self, key: &CacheKey) -> CacheLookup {
        let lookup = CacheLookup::from_result(self.inner.get(key.as_str()).await);

        match &lookup {
            CacheLookup::Hit(_) => debug!(key = %key, "Cache hit"),
            CacheLookup::Miss => debug!(key = %key, "Cache miss"),
            CacheLookup::Unavailable(reason) => warn!(
                key = %key,
                backend = self.inner.backend(),
                error = %reason,
                "Cache unavailable, falling back to store"
            ),
        }

        record_cache_lookup(self.inner.backend(), lookup.outcome());
        lookup
    }

    /// Writes a payload and applies the TTL; never propagates backend errors
    pub async fn store(&self, key: &CacheKey, payload: &str) -> CacheWrite {
        let result = match self.write_mode {
            CacheWriteMode::Atomic => {
                self.inner
                    .set_with_ttl(key.as_str(), payload, self.ttl)
                    .await
            }
            CacheWriteMode::SetThenExpire => match self.inner.set(key.as_str(), payload).await {
                Ok(()) => self
                    .inner
                    .expire(key.as_str(), self.ttl)
                    .await
                    .map(|_| ()),
                Err(e) => Err(e),
            },
        };

        let write = CacheWrite::from_result(result);

        match &write {
            CacheWrite::Stored => debug!(key = %key, ttl_secs = self.ttl.as_secs(), "Cache populated"),
            CacheWrite::Unavailable(reason) => warn!(
                key = %key,
                backend = self.inner.backend(),
                error = %reason,
                "Failed to populate cache"
            ),
        }

        record_cache_write(self.inner.backend(), write.outcome());
        write
    }

    /// Reports whether the backend currently answers
    pub async fn is_reachable(&self) -> Result<(), String> {
        self.inner.ping().await.map_err(|e| e.to_string())
    }
}

//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Key-value cache with per-key expiration
///
/// Every operation may fail independently when the backend is unreachable.
/// Implementations never retry; an `Err` always means the backend could not
/// answer, while `Ok(None)` from [`Cache::get`] means the key is absent.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Backend name used in logs and metrics
    fn backend(&self) -> &'static str;

    /// Gets a raw value from the cache
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores a raw value without touching its expiration
    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Sets the TTL of an existing key; `false` when the key does not exist
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, DomainError>;

    /// Stores a value together with its TTL in a single operation
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        self.set(key, value).await?;
        self.expire(key, ttl).await?;
        Ok(())
    }

    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        self.get("__ping__").await.map(|_| ())
    }
}

/// Outcome of a cache read with backend failures folded in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Non-empty payload found
    Hit(String),
    /// Key absent (or stored empty)
    Miss,
    /// Backend could not be reached
    Unavailable(String),
}

impl CacheLookup {
    pub fn from_result(result: Result<Option<String>, DomainError>) -> Self {
        match result {
            Ok(Some(payload)) if !payload.is_empty() => Self::Hit(payload),
            Ok(_) => Self::Miss,
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Hit(_) => "hit",
            Self::Miss => "miss",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Outcome of a best-effort cache write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheWrite {
    Stored,
    Unavailable(String),
}

impl CacheWrite {
    pub fn from_result(result: Result<(), DomainError>) -> Self {
        match result {
            Ok(()) => Self::Stored,
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

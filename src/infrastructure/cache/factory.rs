//! Cache factory for runtime selection

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::disabled::DisabledCache;
use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Redis cache
    #[default]
    Redis,
    /// In-memory cache using moka
    #[serde(alias = "in_memory")]
    Memory,
    /// No cache; every request goes to the store
    #[serde(alias = "none")]
    Disabled,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::Redis => write!(f, "redis"),
            CacheBackend::Memory => write!(f, "memory"),
            CacheBackend::Disabled => write!(f, "disabled"),
        }
    }
}

impl std::str::FromStr for CacheBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" | "in_memory" | "inmemory" => Ok(CacheBackend::Memory),
            "disabled" | "none" | "off" => Ok(CacheBackend::Disabled),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache backend: {}. Valid backends: redis, memory, disabled",
                s
            ))),
        }
    }
}

/// How a fetched snapshot and its TTL are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheWriteMode {
    /// SET followed by a separate EXPIRE
    #[default]
    SetThenExpire,
    /// Single SET with TTL
    Atomic,
}

/// Configuration for cache factory
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis: RedisCacheConfig,
    pub in_memory: InMemoryCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis: RedisCacheConfig::default(),
            in_memory: InMemoryCacheConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn redis(config: RedisCacheConfig) -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis: config,
            ..Default::default()
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ..Default::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            backend: CacheBackend::Disabled,
            ..Default::default()
        }
    }
}

/// Factory for creating cache instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates the configured cache backend
    pub fn create(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>, DomainError> {
        match config.backend {
            CacheBackend::Redis => Ok(Arc::new(RedisCache::new(config.redis.clone())?)),
            CacheBackend::Memory => Ok(Arc::new(InMemoryCache::with_config(
                config.in_memory.clone(),
            ))),
            CacheBackend::Disabled => Ok(Arc::new(DisabledCache)),
        }
    }
}

//! Redis cache implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::info;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for Redis cache
#[derive(Clone)]
pub struct RedisCacheConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    /// Logical database index
    pub db: i64,
    /// Connect over TLS (`rediss://`)
    pub tls: bool,
    /// Upper bound on establishing the connection
    pub connection_timeout: Duration,
}

impl fmt::Debug for RedisCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("db", &self.db)
            .field("tls", &self.tls)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            tls: true,
            connection_timeout: Duration::from_secs(2),
        }
    }
}

impl RedisCacheConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Builds the connection URL, percent-encoding the password
    pub fn connection_url(&self) -> Result<String, DomainError> {
        let scheme = if self.tls { "rediss" } else { "redis" };
        let mut url = reqwest::Url::parse(&format!(
            "{}://{}:{}/{}",
            scheme, self.host, self.port, self.db
        ))
        .map_err(|e| DomainError::configuration(format!("Invalid Redis address: {}", e)))?;

        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            url.set_password(Some(password))
                .map_err(|_| DomainError::configuration("Redis address cannot carry a password"))?;
        }

        Ok(url.to_string())
    }
}

/// Redis cache implementation
///
/// The connection is opened on first use. A failed attempt is not cached, so
/// a Redis instance that is down at startup only degrades requests until it
/// comes back. Once established, `ConnectionManager` reconnects on its own.
pub struct RedisCache {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisCache {
    /// Creates a Redis cache; no network traffic happens until the first call
    pub fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.connection_url()?.as_str())
            .map_err(|e| DomainError::configuration(format!("Invalid Redis settings: {}", e)))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            config,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, DomainError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = tokio::time::timeout(
                    self.config.connection_timeout,
                    ConnectionManager::new(self.client.clone()),
                )
                .await
                .map_err(|_| DomainError::cache("Timed out connecting to Redis"))?
                .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

                info!(
                    host = %self.config.host,
                    port = self.config.port,
                    db = self.config.db,
                    "Connected to Redis"
                );

                Ok::<_, DomainError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }

    /// Whole seconds for EXPIRE/SETEX, at least one
    ///
    /// Redis rejects expirations whose millisecond value overflows a signed
    /// 64-bit integer, so those are refused before a round trip.
    fn ttl_secs(ttl: Duration) -> Result<i64, DomainError> {
        let secs = ttl.as_secs().max(1);

        i64::try_from(secs)
            .ok()
            .filter(|secs| secs.checked_mul(1000).is_some())
            .ok_or_else(|| DomainError::cache(format!("TTL of {} seconds is out of range", secs)))
    }
}

#[async_trait]
impl Cache for RedisCache {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection().await?;

        let result: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))?;

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;

        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, DomainError> {
        let secs = Self::ttl_secs(ttl)?;
        let mut conn = self.connection().await?;

        let updated: bool = conn
            .expire(key, secs)
            .await
            .map_err(|e| {
                DomainError::cache(format!("Failed to update TTL for key '{}': {}", key, e))
            })?;

        Ok(updated)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let secs = Self::ttl_secs(ttl)?.unsigned_abs();
        let mut conn = self.connection().await?;

        let _: () = conn
            .set_ex(key, value, secs)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to ping Redis: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_url_plain() {
        let config = RedisCacheConfig::new("localhost", 6379).with_tls(false);
        assert_eq!(config.connection_url().unwrap(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_connection_url_tls_with_password_and_db() {
        let config = RedisCacheConfig::new("cache.example.com", 6380)
            .with_password("p@ss/word")
            .with_db(2)
            .with_tls(true);

        assert_eq!(
            config.connection_url().unwrap(),
            "rediss://:p%40ss%2Fword@cache.example.com:6380/2"
        );
    }

    #[test]
    fn test_ttl_secs_bounds() {
        assert_eq!(RedisCache::ttl_secs(Duration::from_millis(10)).unwrap(), 1);
        assert_eq!(RedisCache::ttl_secs(Duration::from_secs(300)).unwrap(), 300);

        assert!(RedisCache::ttl_secs(Duration::from_secs(u64::MAX)).is_err());
        assert!(RedisCache::ttl_secs(Duration::from_secs(i64::MAX as u64)).is_err());
    }

    #[test]
    fn test_empty_password_is_ignored() {
        let config = RedisCacheConfig::new("localhost", 6379)
            .with_password("")
            .with_tls(false);

        assert_eq!(config.connection_url().unwrap(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = RedisCacheConfig::new("localhost", 6379).with_password("hunter2");
        let debug = format!("{:?}", config);

        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_new_does_not_connect() {
        let cache = RedisCache::new(RedisCacheConfig::new("localhost", 1).with_tls(false)).unwrap();
        assert!(!cache.connection.initialized());
    }

    #[tokio::test]
    async fn test_unreachable_redis_reports_cache_error() {
        let config = RedisCacheConfig::new("127.0.0.1", 1)
            .with_tls(false)
            .with_connection_timeout(Duration::from_millis(500));
        let cache = RedisCache::new(config).unwrap();

        let result = cache.get("config:prod").await;

        assert!(matches!(result, Err(DomainError::Cache { .. })));
        assert!(!cache.connection.initialized());
    }

    // Note: These tests require a running Redis instance
    fn get_test_config() -> RedisCacheConfig {
        RedisCacheConfig::new("127.0.0.1", 6379).with_tls(false)
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_set_expire_get() {
        let cache = RedisCache::new(get_test_config()).unwrap();

        cache.set("test:key1", "value1").await.unwrap();
        assert!(cache.expire("test:key1", Duration::from_secs(60)).await.unwrap());

        let result = cache.get("test:key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_expire_missing_key() {
        let cache = RedisCache::new(get_test_config()).unwrap();

        let updated = cache
            .expire("test:does-not-exist", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_ping() {
        let cache = RedisCache::new(get_test_config()).unwrap();
        cache.ping().await.unwrap();
    }
}

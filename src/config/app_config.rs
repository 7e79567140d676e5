use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::DEFAULT_KEY_NAMESPACE;
use crate::domain::config::DEFAULT_FEATURE_FLAG_MARKER;
use crate::infrastructure::cache::{
    CacheBackend, CacheConfig, CacheWriteMode, InMemoryCacheConfig, RedisCacheConfig,
};
use crate::infrastructure::observability::MetricsConfig;

/// Variable names kept from the original deployment, applied last
const LEGACY_OVERRIDES: &[(&str, &str)] = &[
    ("APPCONFIGURATION_CONNECTION_STRING", "source.connection_string"),
    ("REDIS_HOST", "cache.host"),
    ("REDIS_PORT", "cache.port"),
    ("REDIS_PASSWORD", "cache.password"),
    ("REDIS_DB", "cache.db"),
    ("REDIS_SSL", "cache.tls"),
    ("REDIS_KEY_EXPIRATION", "cache.ttl_secs"),
];

/// Largest cache TTL Redis accepts, in seconds
pub const MAX_TTL_SECS: u64 = (i64::MAX / 1000) as u64;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheSettings,
    pub source: SourceSettings,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Cache section
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    pub tls: bool,
    pub ttl_secs: u64,
    pub key_prefix: String,
    pub write_mode: CacheWriteMode,
    pub connect_timeout_ms: u64,
    pub max_capacity: u64,
}

impl std::fmt::Debug for CacheSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSettings")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("db", &self.db)
            .field("tls", &self.tls)
            .field("ttl_secs", &self.ttl_secs)
            .field("key_prefix", &self.key_prefix)
            .field("write_mode", &self.write_mode)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("max_capacity", &self.max_capacity)
            .finish()
    }
}

/// Configuration store section
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub connection_string: Option<String>,
    pub feature_flag_marker: String,
    pub api_version: String,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for SourceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceSettings")
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "[REDACTED]"),
            )
            .field("feature_flag_marker", &self.feature_flag_marker)
            .field("api_version", &self.api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            tls: true,
            ttl_secs: 300,
            key_prefix: DEFAULT_KEY_NAMESPACE.to_string(),
            write_mode: CacheWriteMode::default(),
            connect_timeout_ms: 2000,
            max_capacity: 10_000,
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            connection_string: None,
            feature_flag_marker: DEFAULT_FEATURE_FLAG_MARKER.to_string(),
            api_version: "1.0".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Backend selection and connection settings for the cache factory
    pub fn to_cache_config(&self) -> CacheConfig {
        let mut redis = RedisCacheConfig::new(self.host.clone(), self.port)
            .with_db(self.db)
            .with_tls(self.tls)
            .with_connection_timeout(Duration::from_millis(self.connect_timeout_ms));

        if let Some(password) = &self.password {
            redis = redis.with_password(password.clone());
        }

        CacheConfig {
            backend: self.backend,
            redis,
            in_memory: InMemoryCacheConfig::default().with_max_capacity(self.max_capacity),
        }
    }
}

impl SourceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Loads configuration from files and the process environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(std::env::vars().collect())
    }

    /// Loads configuration using `env` in place of the process environment
    pub fn load_from(env: config::Map<String, String>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            );

        for (variable, key) in LEGACY_OVERRIDES {
            let value = env.get(*variable).filter(|v| !v.is_empty()).cloned();
            builder = builder.set_override_option(*key, value)?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.cache.ttl_secs > MAX_TTL_SECS {
            return Err(config::ConfigError::Message(format!(
                "cache.ttl_secs must be at most {}, got {}",
                MAX_TTL_SECS, self.cache.ttl_secs
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_from(env(&[])).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.key_prefix, "config");
        assert!(config.cache.tls);
        assert_eq!(config.cache.write_mode, CacheWriteMode::SetThenExpire);
        assert!(config.source.connection_string.is_none());
        assert_eq!(config.source.feature_flag_marker, ".appconfig.featureflag/");
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_prefixed_environment() {
        let config = AppConfig::load_from(env(&[
            ("APP__SERVER__PORT", "9090"),
            ("APP__CACHE__BACKEND", "memory"),
            ("APP__CACHE__WRITE_MODE", "atomic"),
            ("APP__LOGGING__FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.write_mode, CacheWriteMode::Atomic);
        assert!(matches!(config.logging.format, LogFormat::Json));
    }

    #[test]
    fn test_legacy_variables_override() {
        let config = AppConfig::load_from(env(&[
            ("APP__CACHE__HOST", "ignored"),
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("REDIS_PASSWORD", "hunter2"),
            ("REDIS_DB", "3"),
            ("REDIS_SSL", "false"),
            ("REDIS_KEY_EXPIRATION", "60"),
            (
                "APPCONFIGURATION_CONNECTION_STRING",
                "Endpoint=https://a.azconfig.io;Id=x;Secret=c2VjcmV0",
            ),
        ]))
        .unwrap();

        assert_eq!(config.cache.host, "cache.internal");
        assert_eq!(config.cache.port, 6380);
        assert_eq!(config.cache.password.as_deref(), Some("hunter2"));
        assert_eq!(config.cache.db, 3);
        assert!(!config.cache.tls);
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert!(config.source.connection_string.is_some());
    }

    #[test]
    fn test_empty_legacy_variable_is_ignored() {
        let config = AppConfig::load_from(env(&[("REDIS_HOST", "")])).unwrap();
        assert_eq!(config.cache.host, "localhost");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        assert!(AppConfig::load_from(env(&[("REDIS_PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn test_out_of_range_ttl_is_rejected() {
        let max = MAX_TTL_SECS.to_string();
        let config = AppConfig::load_from(env(&[("REDIS_KEY_EXPIRATION", &max)])).unwrap();
        assert_eq!(config.cache.ttl_secs, MAX_TTL_SECS);

        let too_large = (MAX_TTL_SECS + 1).to_string();
        assert!(AppConfig::load_from(env(&[("REDIS_KEY_EXPIRATION", &too_large)])).is_err());

        let huge = u64::MAX.to_string();
        assert!(AppConfig::load_from(env(&[("APP__CACHE__TTL_SECS", &huge)])).is_err());
    }

    #[test]
    fn test_cache_config_conversion() {
        let settings = CacheSettings {
            password: Some("secret".to_string()),
            db: 2,
            connect_timeout_ms: 500,
            ..Default::default()
        };

        let cache = settings.to_cache_config();

        assert_eq!(cache.backend, CacheBackend::Redis);
        assert_eq!(cache.redis.password.as_deref(), Some("secret"));
        assert_eq!(cache.redis.db, 2);
        assert_eq!(cache.redis.connection_timeout, Duration::from_millis(500));
        assert_eq!(cache.in_memory.max_capacity, 10_000);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AppConfig {
            cache: CacheSettings {
                password: Some("hunter2".to_string()),
                ..Default::default()
            },
            source: SourceSettings {
                connection_string: Some("Endpoint=x;Id=y;Secret=zzz".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("zzz"));
    }
}

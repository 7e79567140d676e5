//! Config Proxy
//!
//! Read-through cache in front of Azure App Configuration:
//! - Label snapshots served from Redis (or an in-process cache) when present
//! - Fetched, normalized and cached on a miss
//! - Cache outages degrade to direct store reads instead of failing requests

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use api::state::AppState;
use domain::cache::CacheKeyGenerator;
use domain::config::FeatureFlagConvention;
use infrastructure::{
    app_configuration::{
        AppConfigurationClient, AppConfigurationConfig, ConnectionString, NormalizingConfigSource,
    },
    cache::{CacheFactory, FailSafeCache},
    services::ReadThroughHandler,
};
use tracing::info;

/// Create the read-through handler and its backends from configuration
///
/// Nothing is contacted here; the cache connects on first use.
pub fn create_handler(config: &AppConfig) -> anyhow::Result<ReadThroughHandler> {
    let connection: ConnectionString = config
        .source
        .connection_string
        .as_deref()
        .context("No App Configuration connection string (APPCONFIGURATION_CONNECTION_STRING)")?
        .parse()?;

    info!(endpoint = %connection.endpoint(), "Using App Configuration store");

    let client = AppConfigurationClient::new(
        AppConfigurationConfig::new(connection)
            .with_api_version(config.source.api_version.clone())
            .with_request_timeout(config.source.request_timeout()),
    )?;

    let source = NormalizingConfigSource::new(Arc::new(client)).with_convention(
        FeatureFlagConvention::new(config.source.feature_flag_marker.clone()),
    );

    let backend = CacheFactory::new().create(&config.cache.to_cache_config())?;
    info!(backend = backend.backend(), ttl_secs = config.cache.ttl_secs, "Cache configured");

    let cache = FailSafeCache::new(backend, config.cache.ttl())
        .with_write_mode(config.cache.write_mode);

    Ok(ReadThroughHandler::new(
        Arc::new(source),
        cache,
        CacheKeyGenerator::new(config.cache.key_prefix.clone()),
    ))
}

/// Create the application state with all services initialized
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    Ok(AppState::new(create_handler(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::CacheBackend;

    fn config_with(connection_string: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.source.connection_string = connection_string.map(str::to_string);
        config.cache.backend = CacheBackend::Memory;
        config
    }

    #[test]
    fn test_create_app_state() {
        let state = create_app_state(&config_with(Some(
            "Endpoint=https://example.azconfig.io;Id=x;Secret=c2VjcmV0",
        )))
        .unwrap();

        assert_eq!(state.cache().backend(), "memory");
    }

    #[test]
    fn test_missing_connection_string_is_rejected() {
        assert!(create_handler(&config_with(None)).is_err());
        assert!(create_handler(&config_with(Some("Endpoint=https://x.azconfig.io"))).is_err());
    }
}

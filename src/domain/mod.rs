//! Domain layer - Core entities and capabilities

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, CacheKey, CacheKeyGenerator, CacheLookup, CacheWrite};
pub use config::{
    ConfigSetting, ConfigSnapshot, ConfigSource, ConfigValue, FeatureFlagConvention, LabelFilter,
    SettingsStore,
};
pub use error::DomainError;

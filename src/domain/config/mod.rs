//! Configuration domain - labeled settings and their normalized snapshots

mod entity;
mod feature_flag;
mod repository;

pub use entity::{ConfigSetting, ConfigSnapshot, ConfigValue, LabelFilter};
pub use feature_flag::{DEFAULT_FEATURE_FLAG_MARKER, FeatureFlagConvention};
pub use repository::{ConfigSource, SettingsStore};

#[cfg(test)]
pub use repository::{MockConfigSource, MockSettingsStore};

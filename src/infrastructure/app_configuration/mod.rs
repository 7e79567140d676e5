//! Azure App Configuration - settings store adapters

mod client;
mod connection_string;
#[cfg(test)]
mod in_memory;
mod source;

pub use client::{AppConfigurationClient, AppConfigurationConfig};
pub use connection_string::ConnectionString;
#[cfg(test)]
pub use in_memory::InMemorySettingsStore;
pub use source::NormalizingConfigSource;

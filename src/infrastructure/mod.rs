//! Infrastructure layer - External service implementations

pub mod app_configuration;
pub mod cache;
pub mod logging;
pub mod observability;
pub mod services;

//! Null-object cache used when no cache backend is configured

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Cache that stores nothing: every lookup misses and every write is dropped
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCache;

#[async_trait]
impl Cache for DisabledCache {
    fn backend(&self) -> &'static str {
        "disabled"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

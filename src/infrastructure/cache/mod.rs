//! Cache infrastructure - Cache implementations

mod disabled;
mod factory;
mod fail_safe;
mod in_memory;
mod redis;

pub use disabled::DisabledCache;
pub use factory::{CacheBackend, CacheConfig, CacheFactory, CacheWriteMode};
pub use fail_safe::FailSafeCache;
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use redis::{RedisCache, RedisCacheConfig};

//! Cache domain - Key-value cache abstraction used by the read-through handler

mod key;
mod repository;

pub use key::{CacheKey, CacheKeyGenerator, DEFAULT_KEY_NAMESPACE};
pub use repository::{Cache, CacheLookup, CacheWrite};

#[cfg(test)]
pub use repository::mock::MockCache;

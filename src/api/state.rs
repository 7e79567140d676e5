//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::cache::FailSafeCache;
use crate::infrastructure::services::ReadThroughHandler;

/// Application state shared by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub handler: Arc<ReadThroughHandler>,
}

impl AppState {
    pub fn new(handler: ReadThroughHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn cache(&self) -> &FailSafeCache {
        self.handler.cache()
    }
}

use std::sync::Arc;

use crate::config::{Config, SearchConfig};
use crate::search::SearchBackend;

/// Indices the routes read from
#[derive(Debug, Clone, PartialEq)]
pub struct SearchIndices {
    pub hosts: String,
    pub metadata: String,
    pub policy_response: String,
}

impl From<&SearchConfig> for SearchIndices {
    fn from(config: &SearchConfig) -> Self {
        Self {
            hosts: config.hosts_index.clone(),
            metadata: config.metadata_index.clone(),
            policy_response: config.policy_response_index.clone(),
        }
    }
}

impl Default for SearchIndices {
    fn default() -> Self {
        Self::from(&Config::default_config().search)
    }
}

/// Shared application state passed to all Axum handlers via `.with_state()`.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn SearchBackend>,
    pub indices: SearchIndices,
}

impl AppState {
    pub fn new(search: Arc<dyn SearchBackend>, indices: SearchIndices) -> Self {
        Self { search, indices }
    }
}

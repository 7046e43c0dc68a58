use serde::Serialize;

use super::selectors::Location;
use crate::types::{
    HostInfo, HostPolicyResponse, IndexPattern, Query, ServerApiError, DEFAULT_PAGE_INDEX,
    DEFAULT_PAGE_SIZE,
};

/// The paged host list shown by the list view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostListState {
    pub items: Vec<HostInfo>,
    /// Only true between an issued list fetch and its outcome
    pub is_loading: bool,
    /// Last list fetch failure. Items from an earlier success are kept.
    pub api_error: Option<ServerApiError>,
    pub page_index: u32,
    pub page_size: u32,
    pub total: u64,
    pub index_patterns: Vec<IndexPattern>,
    pub query: Option<Query>,
}

impl Default for HostListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            api_error: None,
            page_index: DEFAULT_PAGE_INDEX,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
            index_patterns: Vec::new(),
            query: None,
        }
    }
}

/// Detail and policy response of the host addressed by `selected_host`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostDetailsState {
    pub selected_id: Option<String>,
    pub details: Option<HostInfo>,
    pub details_loading: bool,
    pub details_error: Option<ServerApiError>,
    pub policy_response: Option<HostPolicyResponse>,
    pub policy_response_loading: bool,
    pub policy_response_error: Option<ServerApiError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostState {
    pub location: Option<Location>,
    pub list: HostListState,
    pub details: HostDetailsState,
}

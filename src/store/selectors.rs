use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::state::HostState;
use crate::types::{HostInfo, DEFAULT_PAGE_INDEX, DEFAULT_PAGE_SIZE};

/// Path of the host list view
pub const HOST_LIST_PATH: &str = "/hosts";

/// The current URL, split the way the router reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    /// Query string without the leading '?'
    pub search: String,
}

impl FromStr for Location {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let without_fragment = s.split('#').next().unwrap_or("");
        let (pathname, search) = match without_fragment.split_once('?') {
            Some((path, search)) => (path, search),
            None => (without_fragment, ""),
        };
        Ok(Location {
            pathname: pathname.to_string(),
            search: search.to_string(),
        })
    }
}

/// Query parameters the host list view understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiQueryParams {
    pub page_index: u32,
    pub page_size: u32,
    /// Rison-encoded search bar query
    pub management_query: Option<String>,
    pub selected_host: Option<String>,
}

impl Default for UiQueryParams {
    fn default() -> Self {
        Self {
            page_index: DEFAULT_PAGE_INDEX,
            page_size: DEFAULT_PAGE_SIZE,
            management_query: None,
            selected_host: None,
        }
    }
}

impl UiQueryParams {
    /// Later occurrences of a key win; unparsable paging values keep the default
    pub fn from_location(location: &Location) -> Self {
        let mut params = UiQueryParams::default();
        for (key, value) in url::form_urlencoded::parse(location.search.as_bytes()) {
            match key.as_ref() {
                "page_index" => {
                    if let Ok(index) = value.trim().parse::<u32>() {
                        params.page_index = index;
                    }
                }
                "page_size" => match value.trim().parse::<u32>() {
                    Ok(size) if size > 0 => params.page_size = size,
                    _ => {}
                },
                "management_query" => params.management_query = Some(value.into_owned()),
                "selected_host" if !value.is_empty() => {
                    params.selected_host = Some(value.into_owned())
                }
                _ => {}
            }
        }
        params
    }
}

pub fn is_location_on_host_page(location: Option<&Location>) -> bool {
    location.is_some_and(|l| l.pathname == HOST_LIST_PATH)
}

pub fn is_on_host_page(state: &HostState) -> bool {
    is_location_on_host_page(state.location.as_ref())
}

pub fn ui_query_params(state: &HostState) -> UiQueryParams {
    state
        .location
        .as_ref()
        .map(UiQueryParams::from_location)
        .unwrap_or_default()
}

pub fn has_selected_host(state: &HostState) -> bool {
    ui_query_params(state).selected_host.is_some()
}

pub fn selected_host_id(state: &HostState) -> Option<&str> {
    state.details.selected_id.as_deref()
}

pub fn list_data(state: &HostState) -> &[HostInfo] {
    &state.list.items
}

/// What the details view shows next to the selected host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedHostSummary {
    pub host_id: String,
    pub isolation_supported: bool,
    pub policy_status: Option<String>,
}

/// `None` until the details of the selected host have arrived
pub fn selected_host_summary(state: &HostState) -> Option<SelectedHostSummary> {
    let details = state.details.details.as_ref()?;
    Some(SelectedHostSummary {
        host_id: details.host_id().to_string(),
        isolation_supported: details.is_isolation_supported(),
        policy_status: state
            .details
            .policy_response
            .as_ref()
            .and_then(|r| r.applied_status())
            .map(str::to_string),
    })
}

pub fn is_loading(state: &HostState) -> bool {
    state.list.is_loading || state.details.details_loading || state.details.policy_response_loading
}

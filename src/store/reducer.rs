use super::action::HostAction;
use super::selectors::{is_location_on_host_page, Location, UiQueryParams};
use super::state::{HostDetailsState, HostListState, HostState};
use crate::rison;

/// Where the user was and where they are now, as far as the host reducers
/// care. Built by the store from the previous and current location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTransition {
    pub was_on_list_page: bool,
    pub is_on_list_page: bool,
    /// `selected_host` of the current location when it is the list view
    pub selected_host: Option<String>,
}

impl RouteTransition {
    pub fn between(previous: Option<&Location>, current: Option<&Location>) -> Self {
        let is_on_list_page = is_location_on_host_page(current);
        let selected_host = if is_on_list_page {
            current.and_then(|l| UiQueryParams::from_location(l).selected_host)
        } else {
            None
        };

        Self {
            was_on_list_page: is_location_on_host_page(previous),
            is_on_list_page,
            selected_host,
        }
    }
}

pub fn host_list_reducer(
    state: HostListState,
    action: &HostAction,
    route: &RouteTransition,
) -> HostListState {
    match action {
        HostAction::ServerReturnedHostList(payload) => HostListState {
            items: payload.hosts.clone(),
            total: payload.total,
            page_size: payload.request_page_size,
            page_index: payload.request_page_index,
            is_loading: false,
            ..state
        },
        HostAction::ServerFailedToReturnHostList(error) => HostListState {
            api_error: Some(error.clone()),
            is_loading: false,
            ..state
        },
        HostAction::ServerReturnedMetadataPatterns(patterns) => HostListState {
            index_patterns: patterns.clone(),
            ..state
        },
        HostAction::UserUpdatedSearchBarQuery(raw) => HostListState {
            query: raw.as_deref().and_then(|raw| rison::from_str(raw).ok()),
            ..state
        },
        HostAction::UserChangedUrl(_) => {
            if route.is_on_list_page {
                // Edge-triggered: only entering the view starts a load
                if !route.was_on_list_page {
                    return HostListState {
                        api_error: None,
                        is_loading: true,
                        ..state
                    };
                }
                return state;
            }
            HostListState::default()
        }
        _ => state,
    }
}

pub fn host_details_reducer(
    state: HostDetailsState,
    action: &HostAction,
    route: &RouteTransition,
) -> HostDetailsState {
    match action {
        HostAction::UserChangedUrl(_) => match &route.selected_host {
            None => HostDetailsState::default(),
            Some(selected) if state.selected_id.as_ref() == Some(selected) => state,
            Some(selected) => HostDetailsState {
                selected_id: Some(selected.clone()),
                details_loading: true,
                policy_response_loading: true,
                ..HostDetailsState::default()
            },
        },
        HostAction::ServerReturnedHostDetails(details) => HostDetailsState {
            details: Some(details.clone()),
            details_loading: false,
            details_error: None,
            ..state
        },
        HostAction::ServerFailedToReturnHostDetails(error) => HostDetailsState {
            details_error: Some(error.clone()),
            details_loading: false,
            ..state
        },
        HostAction::ServerReturnedHostPolicyResponse(response) => HostDetailsState {
            policy_response: Some(response.policy_response.clone()),
            policy_response_loading: false,
            policy_response_error: None,
            ..state
        },
        HostAction::ServerFailedToReturnHostPolicyResponse(error) => HostDetailsState {
            policy_response_error: Some(error.clone()),
            policy_response_loading: false,
            ..state
        },
        _ => state,
    }
}

/// Next store state for `action`. Pure: no I/O, no side effects.
pub fn host_reducer(state: HostState, action: &HostAction) -> HostState {
    let HostState {
        location,
        list,
        details,
    } = state;

    let next_location = match action {
        HostAction::UserChangedUrl(next) => Some(next.clone()),
        _ => location.clone(),
    };
    let route = RouteTransition::between(location.as_ref(), next_location.as_ref());

    HostState {
        list: host_list_reducer(list, action, &route),
        details: host_details_reducer(details, action, &route),
        location: next_location,
    }
}

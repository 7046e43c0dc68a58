use log::{debug, warn, Level};
use logging_timer::timer;

use super::action::HostAction;
use super::selectors::{self, UiQueryParams};
use super::state::HostState;
use crate::client::EndpointApi;
use crate::error::EndpointError;
use crate::rison;
use crate::types::{HostListRequest, IndexPattern, METADATA_INDEX_PATTERN};

/// Issues the network requests a URL change calls for and reports every
/// outcome as a follow-up action. Errors never escape `handle`.
pub struct HostMiddleware<A> {
    api: A,
    metadata_index_pattern: String,
}

impl<A: EndpointApi> HostMiddleware<A> {
    pub fn new(api: A) -> Self {
        Self::with_index_pattern(api, METADATA_INDEX_PATTERN)
    }

    pub fn with_index_pattern(api: A, metadata_index_pattern: &str) -> Self {
        Self {
            api,
            metadata_index_pattern: metadata_index_pattern.to_string(),
        }
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Runs after the reducer has applied `action`. `state` is the snapshot
    /// taken at that point; it is not refreshed as follow-ups are dispatched.
    pub async fn handle<D>(&self, action: &HostAction, state: &HostState, dispatch: &mut D)
    where
        D: FnMut(HostAction),
    {
        if !matches!(action, HostAction::UserChangedUrl(_)) || !selectors::is_on_host_page(state)
        {
            return;
        }

        let params = selectors::ui_query_params(state);

        if !selectors::has_selected_host(state) {
            if let Err(error) = self.load_host_list(&params, dispatch).await {
                warn!("Failed to load host list: {}", error);
                dispatch(HostAction::ServerFailedToReturnHostList(error.into()));
            }
            return;
        }

        // Navigated straight to a host: the list behind it is still empty
        if selectors::list_data(state).is_empty() {
            let request = HostListRequest::new(params.page_index, params.page_size, None);
            if let Err(error) = self.fetch_page(&request, dispatch).await {
                warn!("Failed to load host list: {}", error);
                dispatch(HostAction::ServerFailedToReturnHostList(error.into()));
                return;
            }
        }

        // The details reducer has already recorded the host from the URL
        if let Some(host_id) = selectors::selected_host_id(state) {
            self.load_host_details(host_id, dispatch).await;
        }
    }

    async fn fetch_index_patterns(&self) -> Result<Vec<IndexPattern>, EndpointError> {
        let fields = self
            .api
            .fields_for_wildcard(&self.metadata_index_pattern)
            .await?;

        Ok(vec![IndexPattern {
            title: self.metadata_index_pattern.clone(),
            fields,
        }])
    }

    async fn fetch_page<D>(
        &self,
        request: &HostListRequest,
        dispatch: &mut D,
    ) -> Result<(), EndpointError>
    where
        D: FnMut(HostAction),
    {
        let _tmr = timer!(Level::Trace; "HostMiddleware::fetch_page", "{:?}", request);

        let mut response = self.api.host_list(request).await?;
        response.request_page_index = request.page_index();
        debug!(
            "Received {} of {} hosts for page {}",
            response.hosts.len(),
            response.total,
            response.request_page_index
        );
        dispatch(HostAction::ServerReturnedHostList(response));
        Ok(())
    }

    async fn load_host_list<D>(
        &self,
        params: &UiQueryParams,
        dispatch: &mut D,
    ) -> Result<(), EndpointError>
    where
        D: FnMut(HostAction),
    {
        let patterns = self.fetch_index_patterns().await?;
        dispatch(HostAction::ServerReturnedMetadataPatterns(patterns));

        dispatch(HostAction::UserUpdatedSearchBarQuery(
            params.management_query.clone(),
        ));

        let query = rison::decode_query(params.management_query.as_deref())?;

        let request = HostListRequest::new(params.page_index, params.page_size, Some(query.query));
        self.fetch_page(&request, dispatch).await
    }

    /// Details and policy response do not depend on each other: both are
    /// requested at once and each outcome is reported on its own.
    async fn load_host_details<D>(&self, host_id: &str, dispatch: &mut D)
    where
        D: FnMut(HostAction),
    {
        let _tmr = timer!(Level::Trace; "HostMiddleware::load_host_details", "{}", host_id);

        let (details, policy_response) = tokio::join!(
            self.api.host_details(host_id),
            self.api.policy_response(host_id)
        );

        match details {
            Ok(details) => dispatch(HostAction::ServerReturnedHostDetails(details)),
            Err(error) => {
                warn!("Failed to load details for host {}: {}", host_id, error);
                dispatch(HostAction::ServerFailedToReturnHostDetails(error.into()));
            }
        }

        match policy_response {
            Ok(response) => dispatch(HostAction::ServerReturnedHostPolicyResponse(response)),
            Err(error) => {
                warn!("Failed to load policy response for host {}: {}", host_id, error);
                dispatch(HostAction::ServerFailedToReturnHostPolicyResponse(error.into()));
            }
        }
    }
}

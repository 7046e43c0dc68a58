//! HTTP access to the endpoint management API.
//!
//! [`EndpointApi`] is what the host list middleware talks to;
//! [`HttpEndpointClient`] implements it with reqwest against a running server.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::EndpointError;
use crate::types::{
    FieldSpec, FieldsForWildcardResponse, GetHostPolicyResponse, HostInfo, HostListRequest,
    HostResultList, ServerApiError,
};

#[async_trait]
pub trait EndpointApi: Send + Sync {
    /// Field list for every index matching `pattern`
    async fn fields_for_wildcard(&self, pattern: &str) -> Result<Vec<FieldSpec>, EndpointError>;

    /// One page of hosts
    async fn host_list(&self, request: &HostListRequest) -> Result<HostResultList, EndpointError>;

    async fn host_details(&self, host_id: &str) -> Result<HostInfo, EndpointError>;

    async fn policy_response(&self, host_id: &str)
        -> Result<GetHostPolicyResponse, EndpointError>;
}

pub struct HttpEndpointClient {
    client: Client,
    base_url: Url,
}

impl HttpEndpointClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EndpointError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            EndpointError::ConfigError(format!("Invalid base url '{}': {}", base_url, e))
        })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Build a URL from path segments. Segments are percent-encoded, so host
    /// ids can be passed through as-is.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, EndpointError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                EndpointError::ConfigError(format!(
                    "Base url '{}' cannot have a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, EndpointError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let api_error = serde_json::from_str::<ServerApiError>(&body).unwrap_or_else(|_| {
            ServerApiError {
                status_code: status.as_u16(),
                error: status.canonical_reason().unwrap_or("Error").to_string(),
                message: body,
            }
        });
        Err(EndpointError::ApiError(api_error))
    }
}

#[async_trait]
impl EndpointApi for HttpEndpointClient {
    async fn fields_for_wildcard(&self, pattern: &str) -> Result<Vec<FieldSpec>, EndpointError> {
        let url = self.endpoint(&["api", "index_patterns", "_fields_for_wildcard"])?;
        debug!("GET {} pattern={}", url, pattern);

        let response = self
            .client
            .get(url)
            .query(&[("pattern", pattern)])
            .send()
            .await?;
        let body: FieldsForWildcardResponse = Self::read_json(response).await?;
        Ok(body.fields)
    }

    async fn host_list(&self, request: &HostListRequest) -> Result<HostResultList, EndpointError> {
        let url = self.endpoint(&["api", "endpoint", "metadata"])?;
        debug!("POST {} {:?}", url, request);

        let response = self.client.post(url).json(request).send().await?;
        Self::read_json(response).await
    }

    async fn host_details(&self, host_id: &str) -> Result<HostInfo, EndpointError> {
        let url = self.endpoint(&["api", "endpoint", "metadata", host_id])?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn policy_response(
        &self,
        host_id: &str,
    ) -> Result<GetHostPolicyResponse, EndpointError> {
        let url = self.endpoint(&["api", "endpoint", "policy_response"])?;
        debug!("GET {} hostId={}", url, host_id);

        let response = self
            .client
            .get(url)
            .query(&[("hostId", host_id)])
            .send()
            .await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::state::{AppState, SearchIndices};
    use crate::server::create_router;
    use crate::store::{HostAction, Store};
    use crate::test_support::{metadata_doc, FakeSearch};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    async fn spawn_server(search: FakeSearch) -> String {
        let state = AppState::new(Arc::new(search), SearchIndices::default());
        let app = create_router(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn populated_search() -> FakeSearch {
        FakeSearch::new()
            .with_search(
                "metrics-endpoint.metadata-*",
                json!({
                    "hits": {
                        "total": {"value": 2},
                        "hits": [
                            {"_source": metadata_doc("host-1", "Windows", "7.14.0")},
                            {"_source": metadata_doc("host-2", "Linux", "7.14.0")}
                        ]
                    },
                    "aggregations": {"total": {"value": 2}}
                }),
            )
            .with_search(
                "metrics-endpoint.policy-*",
                json!({
                    "hits": {
                        "total": {"value": 1},
                        "hits": [{"_source": {
                            "host": {"id": "host-1"},
                            "Endpoint": {"policy": {"applied": {"status": "success"}}}
                        }}]
                    }
                }),
            )
            .with_field_caps(
                "metrics-endpoint.metadata-*",
                json!({
                    "fields": {
                        "host.id": {"keyword": {"type": "keyword", "searchable": true, "aggregatable": true}}
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_client_against_live_server() {
        let base_url = spawn_server(populated_search()).await;
        let client = HttpEndpointClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let fields = client
            .fields_for_wildcard("metrics-endpoint.metadata-*")
            .await
            .unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "host.id");

        let list = client
            .host_list(&HostListRequest::new(0, 10, None))
            .await
            .unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.hosts.len(), 2);
        assert_eq!(list.request_page_size, 10);

        let details = client.host_details("host-1").await.unwrap();
        assert_eq!(details.host_id(), "host-1");

        let policy = client.policy_response("host-1").await.unwrap();
        assert_eq!(policy.policy_response.applied_status(), Some("success"));
    }

    #[tokio::test]
    async fn test_client_reports_api_errors() {
        let base_url = spawn_server(FakeSearch::new()).await;
        let client = HttpEndpointClient::new(&base_url, Duration::from_secs(5)).unwrap();

        match client.host_details("missing host").await {
            Err(EndpointError::ApiError(err)) => {
                assert_eq!(err.status_code, 404);
                assert_eq!(err.error, "Not Found");
            }
            other => panic!("expected a 404 api error, got {:?}", other),
        }

        match client.host_list(&HostListRequest::new(0, 0, None)).await {
            Err(EndpointError::ApiError(err)) => assert_eq!(err.status_code, 400),
            other => panic!("expected a 400 api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_network_error() {
        // Bind then drop to get a port nothing is listening on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HttpEndpointClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let result = client.host_list(&HostListRequest::new(0, 10, None)).await;
        assert!(matches!(result, Err(EndpointError::NetworkError(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpEndpointClient::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(EndpointError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_store_end_to_end() {
        let base_url = spawn_server(populated_search()).await;
        let client = HttpEndpointClient::new(&base_url, Duration::from_secs(5)).unwrap();
        let mut store = Store::new(client);

        store
            .dispatch(HostAction::UserChangedUrl(
                "/hosts?page_index=0&page_size=10".parse().unwrap(),
            ))
            .await;

        let state = store.state();
        assert!(!state.list.is_loading);
        assert!(state.list.api_error.is_none());
        assert_eq!(state.list.items.len(), 2);
        assert_eq!(state.list.index_patterns.len(), 1);
        assert_eq!(state.list.index_patterns[0].title, "metrics-endpoint.metadata-*");
    }
}

//! Fakes and fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::client::EndpointApi;
use crate::error::EndpointError;
use crate::search::SearchBackend;
use crate::types::{
    AgentDetails, FieldSpec, GetHostPolicyResponse, HostDetails, HostInfo, HostListRequest,
    HostMetadata, HostOs, HostPolicyResponse, HostRef, HostResultList, HostStatus, ServerApiError,
};

pub fn host_info(id: &str) -> HostInfo {
    HostInfo {
        metadata: HostMetadata {
            timestamp: Some(1_588_000_000_000),
            agent: AgentDetails {
                id: format!("agent-{}", id),
                version: "7.14.0".into(),
            },
            host: HostDetails {
                id: id.to_string(),
                hostname: format!("{}.example.com", id),
                ip: vec!["10.0.0.1".into()],
                mac: vec![],
                os: HostOs {
                    name: "Windows".into(),
                    full: "Windows 10".into(),
                    version: "10.0".into(),
                },
            },
            other: Default::default(),
        },
        host_status: HostStatus::Online,
    }
}

/// A metadata document as the endpoint would index it, checked in just now
pub fn metadata_doc(id: &str, os: &str, agent_version: &str) -> Value {
    json!({
        "@timestamp": Utc::now().timestamp_millis(),
        "agent": {"id": format!("agent-{}", id), "version": agent_version},
        "host": {
            "id": id,
            "hostname": format!("{}.example.com", id),
            "ip": ["10.0.0.1"],
            "os": {"name": os, "full": os, "version": "1"}
        },
        "event": {"created": Utc::now().timestamp_millis()}
    })
}

pub fn not_found(message: &str) -> ServerApiError {
    ServerApiError {
        status_code: 404,
        error: "Not Found".into(),
        message: message.into(),
    }
}

/// In-memory search backend. Unknown indices search as empty.
#[derive(Default)]
pub struct FakeSearch {
    searches: HashMap<String, Value>,
    field_caps: HashMap<String, Value>,
    failing: Option<ServerApiError>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, index: &str, response: Value) -> Self {
        self.searches.insert(index.to_string(), response);
        self
    }

    pub fn with_field_caps(mut self, index: &str, response: Value) -> Self {
        self.field_caps.insert(index.to_string(), response);
        self
    }

    /// Every call fails with `error`
    pub fn failing(mut self, error: ServerApiError) -> Self {
        self.failing = Some(error);
        self
    }

    /// (index, body) of every search issued so far
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for FakeSearch {
    async fn search(&self, index: &str, body: Value) -> Result<Value, EndpointError> {
        self.requests
            .lock()
            .unwrap()
            .push((index.to_string(), body));
        if let Some(error) = &self.failing {
            return Err(EndpointError::ApiError(error.clone()));
        }
        Ok(self
            .searches
            .get(index)
            .cloned()
            .unwrap_or_else(|| json!({"hits": {"total": {"value": 0}, "hits": []}})))
    }

    async fn field_caps(&self, index: &str) -> Result<Value, EndpointError> {
        if let Some(error) = &self.failing {
            return Err(EndpointError::ApiError(error.clone()));
        }
        Ok(self
            .field_caps
            .get(index)
            .cloned()
            .unwrap_or_else(|| json!({"fields": {}})))
    }
}

/// Canned endpoint API. Unless configured, the host list is an empty page,
/// details are a 404 and the policy response succeeds.
pub struct FakeApi {
    fields: Result<Vec<FieldSpec>, ServerApiError>,
    host_list: Result<HostResultList, ServerApiError>,
    details: Result<HostInfo, ServerApiError>,
    policy_response: Result<GetHostPolicyResponse, ServerApiError>,
    list_requests: Mutex<Vec<HostListRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            fields: Ok(vec![FieldSpec {
                name: "host.hostname".into(),
                field_type: "string".into(),
                searchable: true,
                aggregatable: true,
            }]),
            host_list: Ok(HostResultList::default()),
            details: Err(not_found("no details configured")),
            policy_response: Ok(GetHostPolicyResponse {
                policy_response: HostPolicyResponse {
                    timestamp: Some(1_588_000_000_000),
                    host: Some(HostRef { id: "any".into() }),
                    other: Default::default(),
                },
            }),
            list_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fields(mut self, fields: Result<Vec<FieldSpec>, ServerApiError>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_host_list(mut self, list: Result<HostResultList, ServerApiError>) -> Self {
        self.host_list = list;
        self
    }

    pub fn with_details(mut self, details: Result<HostInfo, ServerApiError>) -> Self {
        self.details = details;
        self
    }

    pub fn with_policy_response(
        mut self,
        response: Result<GetHostPolicyResponse, ServerApiError>,
    ) -> Self {
        self.policy_response = response;
        self
    }

    pub fn list_requests(&self) -> Vec<HostListRequest> {
        self.list_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EndpointApi for FakeApi {
    async fn fields_for_wildcard(&self, _pattern: &str) -> Result<Vec<FieldSpec>, EndpointError> {
        self.fields.clone().map_err(EndpointError::ApiError)
    }

    async fn host_list(&self, request: &HostListRequest) -> Result<HostResultList, EndpointError> {
        self.list_requests.lock().unwrap().push(request.clone());
        self.host_list.clone().map_err(EndpointError::ApiError)
    }

    async fn host_details(&self, _host_id: &str) -> Result<HostInfo, EndpointError> {
        self.details.clone().map_err(EndpointError::ApiError)
    }

    async fn policy_response(
        &self,
        _host_id: &str,
    ) -> Result<GetHostPolicyResponse, EndpointError> {
        self.policy_response.clone().map_err(EndpointError::ApiError)
    }
}

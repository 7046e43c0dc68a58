use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::isolation;

/// Index pattern matching the endpoint metadata documents
pub const METADATA_INDEX_PATTERN: &str = "metrics-endpoint.metadata-*";

/// Hosts that have not checked in for this long are reported offline
pub const HOST_OFFLINE_AFTER_SECS: i64 = 600;

pub const DEFAULT_PAGE_INDEX: u32 = 0;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Error payload returned by the API and carried by every "failed" action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerApiError {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl fmt::Display for ServerApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.error, self.status_code, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostOs {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostDetails {
    pub id: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub ip: Vec<String>,
    #[serde(default)]
    pub mac: Vec<String>,
    #[serde(default)]
    pub os: HostOs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDetails {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
}

/// Metadata document an endpoint reports about itself.
/// Fields this crate does not interpret are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostMetadata {
    #[serde(rename = "@timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub agent: AgentDetails,
    pub host: HostDetails,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Online,
    Offline,
    Error,
}

impl HostStatus {
    /// Derive a status from the last check-in time (epoch millis)
    pub fn from_last_seen(timestamp: Option<i64>, now: DateTime<Utc>) -> Self {
        match timestamp.and_then(DateTime::<Utc>::from_timestamp_millis) {
            Some(seen) if (now - seen).num_seconds() <= HOST_OFFLINE_AFTER_SECS => {
                HostStatus::Online
            }
            Some(_) => HostStatus::Offline,
            None => HostStatus::Error,
        }
    }
}

/// One entry of the host list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    pub metadata: HostMetadata,
    pub host_status: HostStatus,
}

impl HostInfo {
    pub fn host_id(&self) -> &str {
        &self.metadata.host.id
    }

    pub fn is_isolation_supported(&self) -> bool {
        isolation::is_isolation_supported(
            &self.metadata.host.os.name,
            &self.metadata.agent.version,
        )
    }
}

/// A page of hosts as returned by `POST /api/endpoint/metadata`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostResultList {
    pub hosts: Vec<HostInfo>,
    pub total: u64,
    pub request_page_size: u32,
    pub request_page_index: u32,
}

/// One element of the `paging_properties` array. The wire format is an array
/// of single-key objects: `[{"page_index": 0}, {"page_size": 10}]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagingProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Body of `POST /api/endpoint/metadata`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostListRequest {
    #[serde(default)]
    pub paging_properties: Vec<PagingProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl HostListRequest {
    pub fn new(page_index: u32, page_size: u32, filter: Option<String>) -> Self {
        Self {
            paging_properties: vec![
                PagingProperty {
                    page_index: Some(page_index),
                    page_size: None,
                },
                PagingProperty {
                    page_index: None,
                    page_size: Some(page_size),
                },
            ],
            filter,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.paging_properties
            .iter()
            .find_map(|p| p.page_index)
            .unwrap_or(DEFAULT_PAGE_INDEX)
    }

    pub fn page_size(&self) -> u32 {
        self.paging_properties
            .iter()
            .find_map(|p| p.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Policy application status reported by a single host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostPolicyResponse {
    #[serde(rename = "@timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostRef>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostRef {
    pub id: String,
}

impl HostPolicyResponse {
    /// Overall status of the applied policy, e.g. "success" or "failure"
    pub fn applied_status(&self) -> Option<&str> {
        self.other
            .get("Endpoint")
            .and_then(|e| e.pointer("/policy/applied/status"))
            .and_then(Value::as_str)
    }
}

/// Response of `GET /api/endpoint/policy_response`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetHostPolicyResponse {
    pub policy_response: HostPolicyResponse,
}

/// Field description returned by the field-capabilities lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub searchable: bool,
    pub aggregatable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldsForWildcardResponse {
    pub fields: Vec<FieldSpec>,
}

/// Index pattern handed to the search bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPattern {
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

/// Search bar query as stored in the URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub query: String,
    pub language: String,
}

impl Query {
    pub const KUERY: &'static str = "kuery";

    /// The empty query, which matches everything
    pub fn match_all() -> Self {
        Self {
            query: String::new(),
            language: Self::KUERY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_paging_properties_wire_format() {
        let req = HostListRequest::new(2, 25, Some("host.name:foo".into()));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "paging_properties": [{"page_index": 2}, {"page_size": 25}],
                "filter": "host.name:foo"
            })
        );
    }

    #[test]
    fn test_paging_defaults_when_missing() {
        let req: HostListRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.page_index(), 0);
        assert_eq!(req.page_size(), 10);
        assert!(req.filter.is_none());
    }

    #[test]
    fn test_host_metadata_keeps_unknown_fields() {
        let doc = json!({
            "@timestamp": 1588000000000i64,
            "agent": {"id": "a-1", "version": "7.14.0"},
            "host": {"id": "h-1", "hostname": "box", "os": {"name": "Windows"}},
            "endpoint": {"policy": {"id": "p-1"}}
        });
        let metadata: HostMetadata = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(metadata.host.id, "h-1");
        assert_eq!(metadata.other["endpoint"]["policy"]["id"], "p-1");
        assert_eq!(serde_json::to_value(&metadata).unwrap()["endpoint"], doc["endpoint"]);
    }

    #[test]
    fn test_host_status_from_last_seen() {
        let now = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();
        let recent = (now - chrono::Duration::seconds(30)).timestamp_millis();
        let stale = (now - chrono::Duration::hours(2)).timestamp_millis();
        assert_eq!(HostStatus::from_last_seen(Some(recent), now), HostStatus::Online);
        assert_eq!(HostStatus::from_last_seen(Some(stale), now), HostStatus::Offline);
        assert_eq!(HostStatus::from_last_seen(None, now), HostStatus::Error);
    }

    #[test]
    fn test_policy_response_applied_status() {
        let response: HostPolicyResponse = serde_json::from_value(json!({
            "host": {"id": "h-1"},
            "Endpoint": {"policy": {"applied": {"status": "failure"}}}
        }))
        .unwrap();
        assert_eq!(response.applied_status(), Some("failure"));
    }

    #[test]
    fn test_server_api_error_uses_camel_case() {
        let err: ServerApiError = serde_json::from_value(json!({
            "statusCode": 404,
            "error": "Not Found",
            "message": "no host"
        }))
        .unwrap();
        assert_eq!(err.status_code, 404);
        assert_eq!(err.to_string(), "Not Found (404): no host");
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use log::{debug, info, Level};
use logging_timer::timer;
use serde_json::{json, Value};

use super::state::AppState;
use super::{backend_error, error_response, validation_response, ApiError};
use crate::error::EndpointError;
use crate::types::{HostInfo, HostListRequest, HostMetadata, HostResultList, HostStatus};
use crate::validation::ValidationErrors;

pub const MAX_PAGE_SIZE: u32 = 10_000;

/// POST /api/endpoint/metadata
/// One page of hosts, newest metadata document per host
pub async fn list_metadata(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<HostResultList>, ApiError> {
    let request = parse_list_request(body)?;
    let page_index = request.page_index();
    let page_size = request.page_size();

    let _tmr = timer!(Level::Trace; "list_metadata", "page {} size {}", page_index, page_size);

    let query = list_query(&request);
    let response = state
        .search
        .search(&state.indices.metadata, query)
        .await
        .map_err(|e| backend_error("Failed to search host metadata", e))?;

    let hosts = hosts_from_response(&response, Utc::now())
        .map_err(|e| backend_error("Failed to read host metadata", e))?;
    let total = total_from_response(&response);
    debug!("Returning {} of {} hosts", hosts.len(), total);

    Ok(Json(HostResultList {
        hosts,
        total,
        request_page_size: page_size,
        request_page_index: page_index,
    }))
}

/// GET /api/endpoint/metadata/{id}
pub async fn get_metadata(
    State(state): State<AppState>,
    Path(host_id): Path<String>,
) -> Result<Json<HostInfo>, ApiError> {
    let query = json!({
        "query": {"match": {"host.id": host_id}},
        "sort": [{"event.created": {"order": "desc"}}],
        "size": 1,
    });

    let response = state
        .search
        .search(&state.indices.metadata, query)
        .await
        .map_err(|e| backend_error("Failed to search host metadata", e))?;

    let mut hosts = hosts_from_response(&response, Utc::now())
        .map_err(|e| backend_error("Failed to read host metadata", e))?;

    if hosts.is_empty() {
        info!("No metadata found for host {}", host_id);
        return Err(error_response(StatusCode::NOT_FOUND, "Endpoint Not Found"));
    }
    Ok(Json(hosts.swap_remove(0)))
}

fn parse_list_request(body: Value) -> Result<HostListRequest, ApiError> {
    let request: HostListRequest = serde_json::from_value(body)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e)))?;

    let mut errors = ValidationErrors::new();
    if !(1..=MAX_PAGE_SIZE).contains(&request.page_size()) {
        errors.add(
            "paging_properties.page_size",
            format!("must be between 1 and {}", MAX_PAGE_SIZE),
        );
    }
    errors.into_result(request).map_err(validation_response)
}

/// Search body for one page. Documents are collapsed on `host.id` so each
/// host appears once; the total counts distinct hosts.
pub fn list_query(request: &HostListRequest) -> Value {
    let page_size = u64::from(request.page_size());
    let from = u64::from(request.page_index()) * page_size;

    let query = match request.filter.as_deref().map(str::trim) {
        Some(filter) if !filter.is_empty() => json!({"query_string": {"query": filter}}),
        _ => json!({"match_all": {}}),
    };

    json!({
        "from": from,
        "size": page_size,
        "query": query,
        "collapse": {"field": "host.id"},
        "aggs": {"total": {"cardinality": {"field": "host.id"}}},
        "sort": [{"event.created": {"order": "desc"}}],
    })
}

pub fn hosts_from_response(
    response: &Value,
    now: DateTime<Utc>,
) -> Result<Vec<HostInfo>, EndpointError> {
    let hits = match response.pointer("/hits/hits").and_then(Value::as_array) {
        Some(hits) => hits,
        None => return Ok(Vec::new()),
    };

    hits.iter()
        .filter_map(|hit| hit.get("_source"))
        .map(|source| -> Result<HostInfo, EndpointError> {
            let metadata: HostMetadata = serde_json::from_value(source.clone())?;
            Ok(HostInfo {
                host_status: HostStatus::from_last_seen(metadata.timestamp, now),
                metadata,
            })
        })
        .collect()
}

/// Distinct host count when the aggregation is present, otherwise the hit total
pub fn total_from_response(response: &Value) -> u64 {
    response
        .pointer("/aggregations/total/value")
        .or_else(|| response.pointer("/hits/total/value"))
        .or_else(|| response.pointer("/hits/total"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

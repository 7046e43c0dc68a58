use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use log::debug;
use serde_json::{json, Value};

use super::state::AppState;
use super::{backend_error, error_response, ApiError};

/// Hosts returned by the legacy listing
const HOSTS_PAGE_SIZE: u64 = 100;

/// GET /endpoint/hosts
/// Returns the raw search response for the first hosts in the hosts index
pub async fn list_hosts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    if let Some(key) = params.keys().next() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("[request query.{}]: definition for this key is missing", key),
        ));
    }

    let body = json!({
        "query": {"match_all": {}},
        "size": HOSTS_PAGE_SIZE,
    });
    debug!("Listing hosts from {}", state.indices.hosts);

    let results = state
        .search
        .search(&state.indices.hosts, body)
        .await
        .map_err(|e| backend_error("Failed to list hosts", e))?;

    Ok(Json(results))
}

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use log::info;
use serde_json::json;

use super::state::AppState;
use super::{backend_error, error_response, required_params, ApiError};
use crate::types::{GetHostPolicyResponse, HostPolicyResponse};

/// GET /api/endpoint/policy_response?hostId=
/// Latest policy response reported by one host
pub async fn get_policy_response(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<GetHostPolicyResponse>, ApiError> {
    let host_id = required_params(&params, &["hostId"])?.swap_remove(0);

    let query = json!({
        "query": {"match": {"host.id": host_id}},
        "sort": [{"event.created": {"order": "desc"}}],
        "size": 1,
    });

    let response = state
        .search
        .search(&state.indices.policy_response, query)
        .await
        .map_err(|e| backend_error("Failed to search policy responses", e))?;

    let source = response
        .pointer("/hits/hits/0/_source")
        .cloned()
        .ok_or_else(|| {
            info!("No policy response found for host {}", host_id);
            error_response(StatusCode::NOT_FOUND, "Policy Response Not Found")
        })?;

    let policy_response: HostPolicyResponse = serde_json::from_value(source)
        .map_err(|e| backend_error("Failed to read policy response", e.into()))?;

    Ok(Json(GetHostPolicyResponse { policy_response }))
}

use std::collections::HashMap;

use axum::{extract::Query, Json};
use serde::Serialize;

use super::{required_params, ApiError};

#[derive(Debug, Serialize)]
pub struct LineageResponse {
    pub ok: bool,
}

/// GET /endpoint/process-lineage?uniqueProcessID=&endpointID=
/// Placeholder: validates the process reference and acknowledges it
pub async fn get_process_lineage(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<LineageResponse>, ApiError> {
    required_params(&params, &["uniqueProcessID", "endpointID"])?;
    Ok(Json(LineageResponse { ok: true }))
}

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use super::state::AppState;
use super::{backend_error, required_params, ApiError};
use crate::types::{FieldSpec, FieldsForWildcardResponse};

/// Reported when indices disagree on a field's type
const CONFLICT_TYPE: &str = "conflict";

/// GET /api/index_patterns/_fields_for_wildcard?pattern=
pub async fn fields_for_wildcard(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<FieldsForWildcardResponse>, ApiError> {
    let pattern = required_params(&params, &["pattern"])?.swap_remove(0);

    let caps = state
        .search
        .field_caps(&pattern)
        .await
        .map_err(|e| backend_error("Failed to read field capabilities", e))?;

    Ok(Json(FieldsForWildcardResponse {
        fields: fields_from_caps(&caps),
    }))
}

/// Flatten a field capabilities response into one entry per field, sorted by
/// name. Metadata fields and object containers are left out.
pub fn fields_from_caps(caps: &Value) -> Vec<FieldSpec> {
    let Some(fields) = caps.get("fields").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut specs: Vec<FieldSpec> = fields
        .iter()
        .filter(|(name, _)| !name.starts_with('_'))
        .filter_map(|(name, by_type)| {
            let by_type = by_type.as_object()?;
            let types: Vec<&String> = by_type
                .keys()
                .filter(|t| t.as_str() != "object" && t.as_str() != "nested")
                .collect();

            let field_type = match types.as_slice() {
                [] => return None,
                [single] => search_type_to_field_type(single).to_string(),
                _ => CONFLICT_TYPE.to_string(),
            };
            let capability = |key: &str| {
                types
                    .iter()
                    .any(|t| by_type[t.as_str()].get(key).and_then(Value::as_bool) == Some(true))
            };

            Some(FieldSpec {
                name: name.clone(),
                field_type,
                searchable: capability("searchable"),
                aggregatable: capability("aggregatable"),
            })
        })
        .collect();

    specs.sort_by(|a, b| a.name.cmp(&b.name));
    specs
}

fn search_type_to_field_type(search_type: &str) -> &str {
    match search_type {
        "keyword" | "text" | "constant_keyword" | "wildcard" => "string",
        "long" | "integer" | "short" | "byte" | "double" | "float" | "half_float"
        | "scaled_float" | "unsigned_long" => "number",
        "date" | "date_nanos" => "date",
        other => other,
    }
}

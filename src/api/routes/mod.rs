pub mod hosts;
pub mod index_patterns;
pub mod metadata;
pub mod policy;
pub mod process_lineage;
pub mod state;

use std::collections::HashMap;

use axum::{http::StatusCode, Json};
use log::error;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::EndpointError;
use crate::types::ServerApiError;
use crate::validation::{SchemaValidator, ValidationErrors};

/// Body of every non-2xx response. Shaped like [`ServerApiError`] so the
/// client can read it back, plus the per-field map for validation failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(flatten)]
    pub error: ServerApiError,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationErrors>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: ServerApiError {
                status_code: status.as_u16(),
                error: status.canonical_reason().unwrap_or("Error").to_string(),
                message: message.into(),
            },
            validation: None,
        }),
    )
}

pub fn validation_response(errors: ValidationErrors) -> ApiError {
    let (status, Json(mut body)) = error_response(StatusCode::BAD_REQUEST, errors.to_string());
    body.validation = Some(errors);
    (status, Json(body))
}

/// Search backend failures surface as 500 with the backend's message
pub fn backend_error(context: &str, err: EndpointError) -> ApiError {
    error!("{}: {}", context, err);
    let api_error = ServerApiError::from(err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, api_error.message)
}

/// JSON Schema for a query string made of exactly `names`, all strings
pub fn query_params_schema(names: &[&str]) -> Value {
    let properties: Map<String, Value> = names
        .iter()
        .map(|name| (name.to_string(), json!({"type": "string"})))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": names,
        "additionalProperties": false
    })
}

/// Check query parameters against an exact set of required names. Unknown
/// parameters are rejected too.
pub fn required_params(
    params: &HashMap<String, String>,
    names: &[&str],
) -> Result<Vec<String>, ApiError> {
    let validator = SchemaValidator::new(&query_params_schema(names))
        .map_err(|e| backend_error("Query parameter schema", e))?;

    let object: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    validator
        .validate(&Value::Object(object))
        .into_result(())
        .map_err(validation_response)?;

    Ok(names
        .iter()
        .filter_map(|name| params.get(*name).cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{MISSING_FIELD, UNKNOWN_FIELD};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_required_params_in_declared_order() {
        let values = required_params(&params(&[("b", "2"), ("a", "1")]), &["a", "b"]).unwrap();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn test_required_params_reports_missing_and_unknown() {
        let (status, Json(body)) =
            required_params(&params(&[("extra", "x")]), &["hostId"]).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let validation = body.validation.unwrap();
        assert_eq!(validation.field("hostId").unwrap(), [MISSING_FIELD]);
        assert_eq!(validation.field("extra").unwrap(), [UNKNOWN_FIELD]);
        assert_eq!(body.error.status_code, 400);
    }

    #[test]
    fn test_query_params_schema_shape() {
        let schema = query_params_schema(&["uniqueProcessID", "endpointID"]);
        assert_eq!(schema["required"], json!(["uniqueProcessID", "endpointID"]));
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["properties"]["endpointID"]["type"], "string");
    }

    #[test]
    fn test_error_body_shape() {
        let (_, Json(body)) = error_response(StatusCode::NOT_FOUND, "Endpoint Not Found");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "statusCode": 404,
                "error": "Not Found",
                "message": "Endpoint Not Found"
            })
        );
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::validation::{SchemaValidator, ValidationErrors, ROOT_FIELD};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceType {
    Agnostic,
    Single,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionListType {
    Detection,
    Endpoint,
}

/// An exception list as returned by the lists API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionListSchema {
    pub _tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub _version: Option<String>,
    pub created_at: String,
    pub created_by: String,
    pub description: String,
    pub id: String,
    pub immutable: bool,
    pub list_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    pub name: String,
    pub namespace_type: NamespaceType,
    pub tags: Vec<String>,
    pub tie_breaker_id: String,
    #[serde(rename = "type")]
    pub list_type: ExceptionListType,
    pub updated_at: String,
    pub updated_by: String,
    pub version: u64,
}

impl ExceptionListSchema {
    /// Fields the server fills in on write. Comparisons in tests drop them.
    pub const AUTO_GENERATED_FIELDS: [&'static str; 6] = [
        "id",
        "created_at",
        "updated_at",
        "tie_breaker_id",
        "_version",
        "meta",
    ];

    pub fn strip_auto_generated(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Some(object) = value.as_object_mut() {
            for field in Self::AUTO_GENERATED_FIELDS {
                object.remove(field);
            }
        }
        value
    }
}

/// JSON Schema for an exception list document
pub fn exception_list_json_schema() -> Value {
    let string = json!({"type": "string"});
    let string_array = json!({"type": "array", "items": {"type": "string"}});
    let date = json!({"type": "string", "format": "date-time"});

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "exception list",
        "type": "object",
        "properties": {
            "_tags": string_array,
            "_version": {"type": ["string", "null"]},
            "created_at": date,
            "created_by": string,
            "description": string,
            "id": string,
            "immutable": {"type": "boolean"},
            "list_id": {"type": "string", "minLength": 1},
            "meta": {"type": ["object", "null"]},
            "name": string,
            "namespace_type": {"type": "string", "enum": ["agnostic", "single"]},
            "tags": string_array,
            "tie_breaker_id": string,
            "type": {"type": "string", "enum": ["detection", "endpoint"]},
            "updated_at": date,
            "updated_by": string,
            "version": {"type": "integer", "minimum": 1}
        },
        "required": [
            "_tags", "created_at", "created_by", "description", "id", "immutable",
            "list_id", "name", "namespace_type", "tags", "tie_breaker_id", "type",
            "updated_at", "updated_by", "version"
        ]
    })
}

fn root_error(message: impl Into<String>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(ROOT_FIELD, message);
    errors
}

/// Check a decoded JSON document against the exception list schema.
/// Every failing rule is reported under its field name.
pub fn validate_exception_list(value: &Value) -> Result<ExceptionListSchema, ValidationErrors> {
    let validator = SchemaValidator::new(&exception_list_json_schema())
        .map_err(|e| root_error(e.to_string()))?;
    validator.validate(value).into_result(())?;

    serde_json::from_value(value.clone()).map_err(|e| root_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception_list::exception_list_schema_mock;
    use crate::validation::MISSING_FIELD;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_mock_passes_validation() {
        let mock = exception_list_schema_mock();
        let value = serde_json::to_value(&mock).unwrap();
        let decoded = validate_exception_list(&value).unwrap();
        assert_eq!(decoded, mock);
    }

    #[test]
    fn test_type_serializes_as_type_key() {
        let value = serde_json::to_value(exception_list_schema_mock()).unwrap();
        assert_eq!(value["type"], "endpoint");
        assert_eq!(value["namespace_type"], "agnostic");
        assert!(value.get("list_type").is_none());
    }

    #[test]
    fn test_reports_each_failing_field() {
        let mut value = serde_json::to_value(exception_list_schema_mock()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("name");
        object.insert("namespace_type".into(), json!("global"));
        object.insert("version".into(), json!(0));
        object.insert("created_at".into(), json!("yesterday"));
        object.insert("immutable".into(), json!("no"));

        let errors = validate_exception_list(&value).unwrap_err();
        let reported = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            reported.as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["created_at", "immutable", "name", "namespace_type", "version"]
        );
        assert_eq!(errors.field("name").unwrap(), [MISSING_FIELD]);
        for field in ["created_at", "immutable", "namespace_type", "version"] {
            assert_eq!(errors.field(field).unwrap().len(), 1, "{}", field);
        }
    }

    #[test]
    fn test_unknown_keys_are_allowed() {
        let mut value = serde_json::to_value(exception_list_schema_mock()).unwrap();
        value["os_types"] = json!(["windows"]);
        assert!(validate_exception_list(&value).is_ok());
    }

    #[test]
    fn test_tag_items_must_be_strings() {
        let mut value = serde_json::to_value(exception_list_schema_mock()).unwrap();
        value["_tags"] = json!(["endpoint", 7]);
        let errors = validate_exception_list(&value).unwrap_err();
        assert!(errors.field("_tags.1").is_some());
    }

    #[test]
    fn test_empty_list_id_rejected() {
        let mut value = serde_json::to_value(exception_list_schema_mock()).unwrap();
        value["list_id"] = json!("");
        let errors = validate_exception_list(&value).unwrap_err();
        assert_eq!(errors.field("list_id").unwrap().len(), 1);
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let mut value = serde_json::to_value(exception_list_schema_mock()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("_version");
        object.remove("meta");
        let decoded = validate_exception_list(&value).unwrap();
        assert!(decoded._version.is_none());
        assert!(decoded.meta.is_none());
    }

    #[test]
    fn test_strip_auto_generated() {
        let stripped = exception_list_schema_mock().strip_auto_generated();
        for field in ExceptionListSchema::AUTO_GENERATED_FIELDS {
            assert!(stripped.get(field).is_none(), "{} should be stripped", field);
        }
        assert_eq!(stripped["list_id"], "endpoint_list");
    }
}

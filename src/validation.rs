use std::collections::BTreeMap;
use std::fmt;

use jsonschema::error::ValidationErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EndpointError;

/// Validation failures keyed by field name. Returned as data, never thrown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

pub const ROOT_FIELD: &str = "(root)";
pub const MISSING_FIELD: &str = "required field is missing";
pub const UNKNOWN_FIELD: &str = "definition for this key is missing";

/// A compiled JSON Schema whose failures come back as a [`ValidationErrors`]
/// map. Keys are instance paths in dotted form, so `/tags/1` is `tags.1`.
#[derive(Debug)]
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    pub fn new(schema: &Value) -> Result<Self, EndpointError> {
        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| EndpointError::Error(format!("Invalid JSON schema: {}", e)))?;
        Ok(Self { validator })
    }

    pub fn validate(&self, instance: &Value) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        for error in self.validator.iter_errors(instance) {
            let path = field_path(&error.instance_path.to_string());
            match &error.kind {
                ValidationErrorKind::Required { property } => {
                    let property = match property {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    errors.add(&join_field(&path, &property), MISSING_FIELD);
                }
                ValidationErrorKind::AdditionalProperties { unexpected } => {
                    for key in unexpected {
                        errors.add(&join_field(&path, key), UNKNOWN_FIELD);
                    }
                }
                _ => errors.add(path.as_deref().unwrap_or(ROOT_FIELD), error.to_string()),
            }
        }

        errors
    }
}

/// JSON pointer to dotted field name. `None` for the document root.
fn field_path(pointer: &str) -> Option<String> {
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.replace('/', "."))
    }
}

fn join_field(parent: &Option<String>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}.{}", parent, name),
        None => name.to_string(),
    }
}

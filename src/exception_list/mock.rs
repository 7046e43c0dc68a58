use serde_json::{json, Value};

use super::schema::{ExceptionListSchema, ExceptionListType, NamespaceType};
use super::{
    ENDPOINT_LIST_ID, ENDPOINT_TRUSTED_APPS_LIST_DESCRIPTION, ENDPOINT_TRUSTED_APPS_LIST_ID,
    ENDPOINT_TRUSTED_APPS_LIST_NAME,
};

const DATE_NOW: &str = "2020-04-20T15:25:31.830Z";
const USER: &str = "some user";
const ELASTIC_USER: &str = "elastic";
const DESCRIPTION: &str = "some description";
const LIST_ID: &str = "some-list-id";
const NAME: &str = "some name";
const TIE_BREAKER: &str = "6a76b69d-80df-4ab2-8c3e-85f466b06a0e";
const VERSION: u64 = 1;
const _VERSION: &str = "WzE5LDFd";
const IMMUTABLE: bool = false;

pub fn exception_list_schema_mock() -> ExceptionListSchema {
    ExceptionListSchema {
        _tags: vec![
            "endpoint".into(),
            "process".into(),
            "malware".into(),
            "os:linux".into(),
        ],
        _version: Some(_VERSION.to_string()),
        created_at: DATE_NOW.to_string(),
        created_by: USER.to_string(),
        description: DESCRIPTION.to_string(),
        id: "1".to_string(),
        immutable: IMMUTABLE,
        list_id: ENDPOINT_LIST_ID.to_string(),
        meta: Some(json!({})),
        name: "Sample Endpoint Exception List".to_string(),
        namespace_type: NamespaceType::Agnostic,
        tags: vec!["user added string for a tag".into(), "malware".into()],
        tie_breaker_id: TIE_BREAKER.to_string(),
        list_type: ExceptionListType::Endpoint,
        updated_at: DATE_NOW.to_string(),
        updated_by: "user_name".to_string(),
        version: VERSION,
    }
}

pub fn trusted_apps_list_schema_mock() -> ExceptionListSchema {
    ExceptionListSchema {
        description: ENDPOINT_TRUSTED_APPS_LIST_DESCRIPTION.to_string(),
        list_id: ENDPOINT_TRUSTED_APPS_LIST_ID.to_string(),
        name: ENDPOINT_TRUSTED_APPS_LIST_NAME.to_string(),
        ..exception_list_schema_mock()
    }
}

/// Expected response body for end to end tests, with the parts the server
/// generates (id, timestamps, tie breaker, version) left out.
pub fn exception_response_mock_without_auto_generated_values() -> Value {
    json!({
        "_tags": [],
        "created_by": ELASTIC_USER,
        "description": DESCRIPTION,
        "immutable": IMMUTABLE,
        "list_id": LIST_ID,
        "name": NAME,
        "namespace_type": "single",
        "tags": [],
        "type": "endpoint",
        "updated_by": ELASTIC_USER,
        "version": VERSION,
    })
}

mod mock;
mod schema;

pub use mock::{
    exception_list_schema_mock, exception_response_mock_without_auto_generated_values,
    trusted_apps_list_schema_mock,
};
pub use schema::{
    exception_list_json_schema, validate_exception_list, ExceptionListSchema, ExceptionListType,
    NamespaceType,
};

pub const ENDPOINT_LIST_ID: &str = "endpoint_list";
pub const ENDPOINT_TRUSTED_APPS_LIST_ID: &str = "endpoint_trusted_apps";
pub const ENDPOINT_TRUSTED_APPS_LIST_NAME: &str = "Elastic Endpoint Security Trusted Apps List";
pub const ENDPOINT_TRUSTED_APPS_LIST_DESCRIPTION: &str =
    "Elastic Endpoint Security Trusted Apps List";

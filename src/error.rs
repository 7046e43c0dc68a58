use std::io;
use thiserror::Error;

use crate::types::ServerApiError;
use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(ServerApiError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Decoding error: {0}")]
    DecodeError(String),

    #[error("Validation failed: {0}")]
    ValidationError(ValidationErrors),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Error: {0}")]
    Error(String), // Allows custom application errors
}

impl From<EndpointError> for ServerApiError {
    fn from(err: EndpointError) -> Self {
        match err {
            EndpointError::ApiError(api_err) => api_err,
            EndpointError::NetworkError(e) => ServerApiError {
                status_code: e.status().map(|s| s.as_u16()).unwrap_or(0),
                error: "Network Error".to_string(),
                message: e.to_string(),
            },
            EndpointError::DecodeError(msg) => ServerApiError {
                status_code: 400,
                error: "Bad Request".to_string(),
                message: msg,
            },
            EndpointError::ValidationError(errors) => ServerApiError {
                status_code: 400,
                error: "Bad Request".to_string(),
                message: errors.to_string(),
            },
            other => ServerApiError {
                status_code: 500,
                error: "Internal Server Error".to_string(),
                message: other.to_string(),
            },
        }
    }
}

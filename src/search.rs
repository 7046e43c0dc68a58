use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::EndpointError;
use crate::types::ServerApiError;

/// The search engine the server routes proxy to
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a search request body against `index` and return the raw response
    async fn search(&self, index: &str, body: Value) -> Result<Value, EndpointError>;

    /// Field capabilities of every field in the indices matching `index`
    async fn field_caps(&self, index: &str) -> Result<Value, EndpointError>;
}

pub struct HttpSearchBackend {
    client: Client,
    base_url: Url,
}

impl HttpSearchBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EndpointError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            EndpointError::ConfigError(format!("Invalid search url '{}': {}", base_url, e))
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn index_url(&self, index: &str, api: &str) -> Result<Url, EndpointError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EndpointError::ConfigError("Search url cannot have a path".into()))?
            .pop_if_empty()
            .extend([index, api]);
        Ok(url)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, EndpointError> {
        let status = response.status();
        let body = response.text().await?;
        parse_body(status, &body)
    }
}

/// Decode a backend response body. Error bodies need not be JSON (proxies
/// answer with HTML), and keep the status either way.
fn parse_body(status: StatusCode, body: &str) -> Result<Value, EndpointError> {
    if status.is_success() {
        return Ok(serde_json::from_str(body)?);
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/reason")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());
    warn!("Search backend returned {}: {}", status, message);

    Err(EndpointError::ApiError(ServerApiError {
        status_code: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Error").to_string(),
        message,
    }))
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, index: &str, body: Value) -> Result<Value, EndpointError> {
        let url = self.index_url(index, "_search")?;
        debug!("POST {} {}", url, body);

        let response = self.client.post(url).json(&body).send().await?;
        Self::read_json(response).await
    }

    async fn field_caps(&self, index: &str) -> Result<Value, EndpointError> {
        let url = self.index_url(index, "_field_caps")?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("fields", "*"), ("ignore_unavailable", "true")])
            .send()
            .await?;
        Self::read_json(response).await
    }
}

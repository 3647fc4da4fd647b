//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, error};

use crate::errors::AgentError;

/// HTTP client for admin panel communication
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpClient {
    /// Create a new HTTP client. Every request is bounded by `timeout`.
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self, AgentError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body, discarding the response body on success
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), AgentError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP POST {} failed: {} - {}", path, status, body);
            return Err(AgentError::ReportingError(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}

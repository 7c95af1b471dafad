//! HTTP plumbing for the content-library REST API
//!
//! Thin translation layer from HTTP responses to the crate's typed errors.
//! This layer never retries; recovery from expired credentials happens in
//! the session.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use url::Url;

use crate::error::{Error, Result};

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// HTTP client for the content-library REST API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    base_url: String,
    api_root: String,
}

impl HttpClient {
    /// Create a new HTTP client for the given service base URL and API
    /// root path segment
    pub fn new(base_url: impl Into<String>, api_root: impl Into<String>) -> Self {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_root: api_root.into(),
        }
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let url = format!("{}/{}/{}", self.base_url, self.api_root, path);
        Url::parse(&url).map_err(|e| Error::Config(format!("Invalid API URL {}: {}", url, e)))
    }

    /// Issue an authenticated GET request and decode the JSON response
    #[instrument(skip(self, token), level = "debug")]
    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        let url = self.build_url(path)?;
        debug!("Sending GET request to {}", path);

        let request = self
            .client
            .get(url)
            .header("Authorization", token)
            .header("Content-Type", "application/json");

        self.execute_request(request).await
    }

    /// Issue an unauthenticated POST request with a form-encoded body and
    /// decode the JSON response
    #[instrument(skip(self, form), level = "debug")]
    pub async fn post_form<T, B>(&self, path: &str, form: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path)?;
        debug!("Sending POST request to {}", path);

        let request = self.client.post(url).form(form);

        self.execute_request(request).await
    }

    /// Execute a request and classify the outcome: 2xx decodes the body,
    /// 401 reports an expired credential, anything else reports a request
    /// failure carrying the status and body
    async fn execute_request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(Error::Http)?;
        let status = response.status();
        let response_text = response.text().await.map_err(Error::Http)?;

        if status.is_success() {
            return serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse API response: {}", e);
                Error::UnexpectedResponse(format!("Failed to parse API response: {}", e))
            });
        }

        error!("API error: {} - {}", status, response_text);
        if status == StatusCode::UNAUTHORIZED {
            Err(Error::TokenExpired)
        } else {
            Err(Error::Api {
                status_code: status.as_u16(),
                message: response_text,
            })
        }
    }
}

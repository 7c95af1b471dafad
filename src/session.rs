//! Crawl session owning the credential and document caches
//!
//! The session is the single owner of shared state for a run: the cached
//! bearer credential and the fetched-document cache. Every authenticated
//! call goes through a wrapper that re-acquires the credential and retries
//! exactly once when the backend reports it expired.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::api::{Client, TableField};
use crate::config::{BASE_URL_ENV, Settings, TableQuery};
use crate::error::{Error, Result};
use crate::store::MemoryStore;

/// Store key for the cached bearer credential
const AUTH_TOKEN_KEY: &str = "auth_token";

/// How long an acquired credential is trusted before logging in again
const TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Authenticated session against one content-library service
pub struct Session {
    client: Client,
    store: MemoryStore,
    username: String,
    password: String,
    tables: BTreeMap<String, TableQuery>,
    token_ttl: Duration,
}

impl Session {
    /// Create a session from settings. Fails when the base URL or the
    /// credentials are missing; no network traffic happens yet.
    pub fn new(settings: &Settings) -> Result<Self> {
        if settings.api.base_url.is_empty() {
            return Err(Error::Config(format!(
                "API base URL is not configured; set [api] base_url or {}",
                BASE_URL_ENV
            )));
        }
        let (username, password) = settings.api.credentials()?;

        Ok(Self {
            client: Client::new(&settings.api.base_url, &settings.api.api_root),
            store: MemoryStore::new(),
            username: username.to_string(),
            password: password.to_string(),
            tables: settings.tables.clone(),
            token_ttl: TOKEN_TTL,
        })
    }

    /// The current bearer token, logging in only when no live cached
    /// credential exists
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.store.get(AUTH_TOKEN_KEY) {
            return Ok(token);
        }

        debug!("No cached credential, performing login exchange");
        let token = self.client.login(&self.username, &self.password).await?;
        self.store.set(AUTH_TOKEN_KEY, &token, Some(self.token_ttl));
        Ok(token)
    }

    /// Drop the cached credential so the next call logs in again
    pub fn invalidate_token(&self) {
        self.store.remove(AUTH_TOKEN_KEY);
    }

    /// Fetch a document's content by library path, serving repeat requests
    /// from the session cache. Only non-empty content is cached.
    #[instrument(skip(self), level = "debug")]
    pub async fn document(&self, path: &str) -> Result<Option<String>> {
        if let Some(content) = self.store.get(path) {
            debug!("Document cache hit for {}", path);
            return Ok(Some(content));
        }

        let content = self
            .authenticated(|token| async move { self.client.fetch_document(&token, path).await })
            .await?;

        if let Some(content) = content.as_deref().filter(|c| !c.is_empty()) {
            self.store.set(path, content, None);
        }
        Ok(content)
    }

    /// List the document paths of a library folder
    #[instrument(skip(self), level = "debug")]
    pub async fn folder_documents(&self, folder: &str) -> Result<Vec<String>> {
        self.authenticated(|token| async move {
            self.client.list_folder_documents(&token, folder).await
        })
        .await
    }

    /// Fetch the column definitions of a backend table
    #[instrument(skip(self), level = "debug")]
    pub async fn table_schema(&self, folder: &str, table: &str) -> Result<Vec<TableField>> {
        self.authenticated(|token| async move {
            self.client.fetch_table_schema(&token, folder, table).await
        })
        .await
    }

    /// Look up one member value of a table using its configured member
    /// query. Returns `None` without any network traffic when no query is
    /// configured for the table.
    #[instrument(skip(self), level = "debug")]
    pub async fn table_member(&self, table: &str) -> Result<Option<String>> {
        let Some(spec) = self.tables.get(table) else {
            debug!("No member query configured for table {}", table);
            return Ok(None);
        };

        let query = spec.member_query();
        let query = query.as_str();
        self.authenticated(|token| async move {
            self.client.fetch_table_member(&token, table, query).await
        })
        .await
    }

    /// Run an authenticated call. When the backend rejects the credential,
    /// re-acquire it and retry the call exactly once.
    async fn authenticated<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let token = self.token().await?;
        match call(token).await {
            Err(Error::TokenExpired) => {
                warn!("Credential rejected by the backend, re-acquiring and retrying once");
                self.invalidate_token();
                let token = self.token().await?;
                call(token).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
impl Session {
    pub(crate) fn with_base_url(
        base_url: &str,
        tables: BTreeMap<String, TableQuery>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            client: Client::new(base_url, "rest/api/v1.3"),
            store: MemoryStore::new(),
            username: "apiuser".to_string(),
            password: "apipass".to_string(),
            tables,
            token_ttl,
        }
    }
}

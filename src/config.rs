//! Static configuration for a modtree run
//!
//! Settings load from a TOML file with environment variables taking
//! precedence for the service URL and credentials, so secrets can stay out
//! of the file.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable overriding the service base URL
pub const BASE_URL_ENV: &str = "MODTREE_BASE_URL";
/// Environment variable supplying the API username
pub const USERNAME_ENV: &str = "MODTREE_USERNAME";
/// Environment variable supplying the API password
pub const PASSWORD_ENV: &str = "MODTREE_PASSWORD";

/// Settings file names probed in the working directory, in order
const SETTINGS_CANDIDATES: &[&str] = &["Modtree.toml", "modtree.toml", ".modtree.toml"];

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Service connection settings
    pub api: ApiSettings,

    /// Crawl behavior settings
    pub crawl: CrawlSettings,

    /// Member-query specifications keyed by table name. Tables without an
    /// entry here get their schema fetched but no member lookup.
    pub tables: BTreeMap<String, TableQuery>,
}

/// Connection settings for the content-library service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the service, e.g. `https://api.example.net`
    pub base_url: String,

    /// Root path segment of the REST API
    pub api_root: String,

    /// API username; `MODTREE_USERNAME` takes precedence
    pub username: Option<String>,

    /// API password; `MODTREE_PASSWORD` takes precedence
    pub password: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_root: "rest/api/v1.3".to_string(),
            username: None,
            password: None,
        }
    }
}

impl ApiSettings {
    /// The configured credential pair, or a config error naming the
    /// missing variables
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(Error::Config(format!(
                "API credentials are not configured; set {} and {}",
                USERNAME_ENV, PASSWORD_ENV
            ))),
        }
    }
}

/// Crawl behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// Maximum recursion depth, counting the starting module as one
    /// level. A depth of zero would never bound the recursion and is
    /// rejected at load.
    pub max_depth: u32,

    /// Folders visited by the scan subcommand
    pub folders: Vec<String>,

    /// Directory reports are written to
    pub output_dir: PathBuf,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: 10,
            folders: vec!["modules".to_string()],
            output_dir: PathBuf::from("notes"),
        }
    }
}

/// Member-query specification for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    /// Field selector sent as the `fs` parameter
    pub fs: String,

    /// Argument name to argument value, sent as `qa`/`id` parameter pairs
    pub qav: BTreeMap<String, String>,
}

impl TableQuery {
    /// Render the members-endpoint query string: a `qa=<name>&id=<value>`
    /// fragment per pair in name order, then the `fs` selector.
    pub fn member_query(&self) -> String {
        let mut parts: Vec<String> = self
            .qav
            .iter()
            .map(|(name, value)| format!("qa={}&id={}", name, value))
            .collect();
        parts.push(format!("fs={}", self.fs));
        parts.join("&")
    }
}

impl Settings {
    /// Load settings from a TOML file, then apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut settings: Settings =
            toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the given file, or probe the working directory
    /// for a settings file, or fall back to defaults. Environment
    /// overrides apply in every case.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        for candidate in SETTINGS_CANDIDATES {
            if Path::new(candidate).exists() {
                debug!("Loading settings from {}", candidate);
                return Self::load(candidate);
            }
        }

        debug!("No settings file found, using defaults");
        let mut settings = Self::default();
        settings.apply_env();
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            self.api.base_url = base_url;
        }
        if let Ok(username) = env::var(USERNAME_ENV) {
            self.api.username = Some(username);
        }
        if let Ok(password) = env::var(PASSWORD_ENV) {
            self.api.password = Some(password);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.crawl.max_depth == 0 {
            return Err(Error::Config(
                "crawl.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

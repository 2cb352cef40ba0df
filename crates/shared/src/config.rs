//! Configuration types for the search-engine connection

use serde::{Deserialize, Serialize};

use crate::error::{DaoError, InvalidConfigError};

/// Environment variable overriding [`EngineConfig::host`]
pub const ENV_ENGINE_HOST: &str = "DAO_ENGINE_HOST";
/// Environment variable overriding [`EngineConfig::port`]
pub const ENV_ENGINE_PORT: &str = "DAO_ENGINE_PORT";
/// Environment variable overriding [`EngineConfig::index`]
pub const ENV_ENGINE_INDEX: &str = "DAO_ENGINE_INDEX";

/// When writes become visible to searches and counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Return immediately, visibility on the engine's next refresh
    False,
    /// Force a refresh after each write
    True,
    /// Wait until the next refresh makes the write visible
    #[default]
    WaitFor,
}

impl RefreshPolicy {
    /// Value of the engine's `refresh` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            RefreshPolicy::False => "false",
            RefreshPolicy::True => "true",
            RefreshPolicy::WaitFor => "wait_for",
        }
    }
}

/// Connection settings for the document-search engine
///
/// Loaded from a camelCase JSON file; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Engine host name or address
    pub host: String,

    /// Engine HTTP port
    pub port: u16,

    /// `http` or `https`
    pub scheme: String,

    /// Whole-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Documents fetched per round trip when listing an index
    pub page_size: u32,

    /// Refresh behaviour of writes
    pub refresh: RefreshPolicy,

    /// Index holding the employee documents
    pub index: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9200,
            scheme: "http".to_string(),
            timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
            page_size: 1_000,
            refresh: RefreshPolicy::default(),
            index: "index1".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply `DAO_ENGINE_*` environment overrides
    pub fn with_env_overrides(self) -> crate::Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_ENGINE_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_ENGINE_PORT) {
            self.port = port.trim().parse().map_err(|e| {
                DaoError::Config(format!("{} is not a valid port: {}", ENV_ENGINE_PORT, e))
            })?;
        }
        if let Some(index) = lookup(ENV_ENGINE_INDEX) {
            self.index = index;
        }
        Ok(self)
    }

    /// Reject values that cannot produce a working client
    pub fn validate(&self) -> crate::Result<()> {
        fn invalid(field: &'static str, reason: &str) -> DaoError {
            InvalidConfigError {
                field,
                reason: reason.to_string(),
            }
            .into()
        }

        if self.host.trim().is_empty() {
            return Err(invalid("host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(invalid("port", "must be greater than zero"));
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(invalid("scheme", "must be 'http' or 'https'"));
        }
        if self.timeout_ms == 0 {
            return Err(invalid("timeoutMs", "must be greater than zero"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(invalid("connectTimeoutMs", "must be greater than zero"));
        }
        if self.page_size == 0 {
            return Err(invalid("pageSize", "must be greater than zero"));
        }
        if self.index.trim().is_empty() {
            return Err(invalid("index", "must not be empty"));
        }
        // Engine index names are lowercase and path-safe
        if self.index.chars().any(|c| c.is_ascii_uppercase() || "/\\*?\"<>| ,#".contains(c)) {
            return Err(invalid("index", "must be lowercase without reserved characters"));
        }
        Ok(())
    }

    /// Base URL of the engine, e.g. `http://localhost:9200`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// `host:port` pair used for address resolution
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

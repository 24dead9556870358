//! Configuration for the Appserver gateway

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream Appserver settings
    #[serde(default)]
    pub appserver: AppserverConfig,

    /// Token endpoint and credentials
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Result execution and data row paging
    #[serde(default)]
    pub results: ResultsConfig,

    /// Local HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppserverConfig {
    /// Base URL of the Appserver REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Accept self-signed or otherwise invalid TLS certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Path of the legacy HTML page listing every model
    #[serde(default = "default_comprehensive_models_path")]
    pub comprehensive_models_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// OAuth2 token endpoint
    #[serde(default)]
    pub token_url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub client_id: Option<String>,

    /// Requested scope (default: "openid offline_access <client_id>")
    #[serde(default)]
    pub scope: Option<String>,

    #[serde(default = "default_response_type")]
    pub response_type: String,

    /// Pre-issued bearer token; when set the password grant is skipped
    #[serde(default)]
    pub access_token: Option<String>,

    /// Refresh the cached token this many seconds before it expires
    #[serde(default = "default_token_refresh_margin_secs")]
    pub token_refresh_margin_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// Rows requested per data row page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Upper bound on rows collected by a paginated fetch
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Pause between consecutive page requests
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Pause between result status polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Environment name reported by the health endpoints
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for AppserverConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            accept_invalid_certs: false,
            comprehensive_models_path: default_comprehensive_models_path(),
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            token_url: None,
            username: None,
            password: None,
            client_id: None,
            scope: None,
            response_type: default_response_type(),
            access_token: None,
            token_refresh_margin_secs: default_token_refresh_margin_secs(),
        }
    }
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_rows: default_max_rows(),
            page_delay_ms: default_page_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            environment: default_environment(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults,
    /// then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::read(&path)?,
            _ => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load config from an explicit file, then apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let mut config = Self::read(path)?;
        config.apply_env();
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Default config path (~/.config/appserver-mcp/config.toml on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("appserver-mcp").join("config.toml"))
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("APPSERVER_BASE_URL") {
            self.appserver.base_url = v;
        }
        if let Some(v) = get("PLATFORM_URL") {
            self.platform.token_url = Some(v);
        }
        if let Some(v) = get("PLATFORM_USERNAME") {
            self.platform.username = Some(v);
        }
        if let Some(v) = get("PLATFORM_PASSWORD") {
            self.platform.password = Some(v);
        }
        if let Some(v) = get("PLATFORM_CLIENT_ID") {
            self.platform.client_id = Some(v);
        }
        if let Some(v) = get("PLATFORM_SCOPE") {
            self.platform.scope = Some(v);
        }
        if let Some(v) = get("APPSERVER_ACCESS_TOKEN") {
            self.platform.access_token = Some(v);
        }
        if let Some(v) = get("APP_ENVIRONMENT") {
            self.server.environment = v;
        }
    }

    /// Check that the config can drive a working client
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.appserver.base_url).map_err(|e| {
            Error::Config(format!(
                "Invalid appserver.base_url '{}': {}",
                self.appserver.base_url, e
            ))
        })?;

        let platform = &self.platform;
        if platform.access_token.is_none()
            && (platform.token_url.is_none() || platform.username.is_none())
        {
            return Err(Error::Config(
                "No token source: set platform.access_token or platform.token_url and platform.username".into(),
            ));
        }

        if self.results.page_size == 0 {
            return Err(Error::Config("results.page_size must be greater than 0".into()));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.appserver.request_timeout_secs)
    }
}

impl PlatformConfig {
    /// Scope sent with the password grant
    pub fn effective_scope(&self) -> String {
        match (&self.scope, &self.client_id) {
            (Some(scope), _) => scope.clone(),
            (None, Some(client_id)) => format!("openid offline_access {}", client_id),
            (None, None) => "openid offline_access".to_string(),
        }
    }
}

impl ResultsConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// Default value functions

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_comprehensive_models_path() -> String {
    "/models/comprehensive".to_string()
}

fn default_response_type() -> String {
    "token id_token".to_string()
}

fn default_token_refresh_margin_secs() -> u64 {
    60
}

fn default_page_size() -> usize {
    300
}

fn default_max_rows() -> usize {
    1000
}

fn default_page_delay_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_poll_attempts() -> u32 {
    30
}

fn default_http_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "Production".to_string()
}

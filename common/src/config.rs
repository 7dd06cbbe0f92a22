// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use config::{Config as ConfigFile, Environment, File};
use thiserror::Error;
use url::Url;

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("api_url must be set (API_URL or APP__API_URL)")]
    MissingApiUrl,

    #[error("api_url is not a valid http(s) URL: {0}")]
    InvalidApiUrl(String),

    #[error("invalid listen address {0}")]
    InvalidAddr(String),
}

/// Runtime configuration for the portal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL of the certificate management API
    #[serde(default)]
    pub api_url: String,
    /// Where in-flight uploads are staged
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    #[serde(default)]
    pub cookie: CookieConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_name")]
    pub name: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub max_age_secs: Option<i64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

fn default_cookie_name() -> String {
    "token".to_string()
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            secure: false,
            max_age_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_url: String::new(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upstream_timeout_secs: default_upstream_timeout_secs(),
            cookie: CookieConfig::default(),
        }
    }
}

/// `./config`, or `../config` when started from inside a member crate
fn default_config_dir() -> PathBuf {
    let path = PathBuf::from("./config");
    if path.exists() {
        path
    } else {
        PathBuf::from("../config")
    }
}

impl Config {
    /// Load configuration from `.env`, config files and environment
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is the normal case outside development
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_dir());

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let config: Config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Plain PORT / API_URL win over everything else
            .set_override_option("port", env::var("PORT").ok())?
            .set_override_option("api_url", env::var("API_URL").ok())?
            .build()?
            .try_deserialize()?;

        config.validated()
    }

    /// Normalize and check the loaded values
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.api_url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }

        let parsed = Url::parse(&trimmed).map_err(|e| ConfigError::InvalidApiUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }

        self.api_url = trimmed;
        Ok(self)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddr(addr))
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

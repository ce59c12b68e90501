//! Client configuration
//!
//! The base URL is resolved once, in order: explicit override, the
//! `CARBONLINK_API_URL` environment variable, `~/.carbonlink/config.yaml`,
//! then [`DEFAULT_BASE_URL`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{BASE_URL_ENV, CONFIG_FILE_NAME, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::ConfigError;
use crate::storage::{config_dir, default_credentials_path};

/// Contents of the optional YAML config file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

impl FileConfig {
    /// Load a config file; a missing file yields the empty config
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> PathBuf {
        config_dir().join(CONFIG_FILE_NAME)
    }
}

/// Explicit settings that win over everything else
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub credentials_path: Option<PathBuf>,
}

/// Resolved, validated client configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    base_url: Url,
    pub timeout: Duration,
    pub credentials_path: PathBuf,
}

impl ClientConfig {
    /// Config for a base URL with default timeout and credentials location
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(ClientConfig {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credentials_path: default_credentials_path(),
        })
    }

    /// Resolve from the process environment and the default config file
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let file = FileConfig::load(&FileConfig::default_path())?;
        let env_url = std::env::var(BASE_URL_ENV).ok();
        Self::resolve(overrides, env_url, file)
    }

    /// Resolve from explicit inputs
    pub fn resolve(
        overrides: Overrides,
        env_url: Option<String>,
        file: FileConfig,
    ) -> Result<Self, ConfigError> {
        let base_url = overrides
            .base_url
            .or_else(|| env_url.filter(|url| !url.trim().is_empty()))
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let credentials_path = overrides
            .credentials_path
            .or(file.credentials_path)
            .unwrap_or_else(default_credentials_path);

        Ok(ClientConfig {
            base_url: parse_base_url(&base_url)?,
            timeout: Duration::from_secs(timeout_secs),
            credentials_path,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

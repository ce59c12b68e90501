//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Base URL used when neither an override, the environment, nor the config file provide one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable consulted for the base URL
pub const BASE_URL_ENV: &str = "CARBONLINK_API_URL";

/// Key under which the bearer token is kept in the token store
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Directory (under the home directory) holding config and credentials
pub const CONFIG_DIR_NAME: &str = ".carbonlink";

pub const CONFIG_FILE_NAME: &str = "config.yaml";

pub const CREDENTIALS_FILE_NAME: &str = "credentials.yaml";

/// Log file written by the binary
pub const LOG_FILE_NAME: &str = "carbonlink.log";

/// Application name
pub const APP_NAME: &str = "carbonlink";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

//! Error types for the API client, token store and configuration.

use std::path::PathBuf;

/// Result alias used by every client call
pub type ApiResult<T> = Result<T, ApiError>;

/// Coarse classification of an [`ApiError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a usable response
    Transport,
    /// The server answered with a non-2xx status
    Http,
    /// The request could not be built locally
    Client,
}

/// Failure of a single API call
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid JSON response (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Invalid request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("Could not read stored credentials: {0}")]
    Credentials(#[from] StoreError),

    #[error("Realtime channel is closed")]
    ChannelClosed,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Decode { .. } | Self::ChannelClosed => {
                ErrorKind::Transport
            }
            Self::Http { .. } => ErrorKind::Http,
            Self::Encode(_) | Self::InvalidHeader { .. } | Self::Credentials(_) => {
                ErrorKind::Client
            }
        }
    }

    /// HTTP status, when the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Decode { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Wrap a reqwest failure, phrased the way it is shown to users
    pub(crate) fn transport(source: reqwest::Error, timeout_secs: u64) -> Self {
        let message = if source.is_timeout() {
            format!("Request timed out ({}s)", timeout_secs)
        } else if source.is_connect() {
            format!("Connection failed: {}", source)
        } else if source.is_body() || source.is_decode() {
            format!("Error reading body: {}", source)
        } else {
            format!("Request failed: {}", source)
        };
        Self::Transport { message, source }
    }
}

/// Failure reading or writing the token store
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed credentials file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Token store lock poisoned")]
    Poisoned,
}

/// Invalid client configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported base URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

//! # carbonlink
//!
//! Client for the carbon capture network API.
//!
//! ## Features
//! - One request primitive: JSON in, JSON out, bearer token from the local store
//! - Typed request bodies for auth, sensor readings and carbon credits
//! - Domain methods for units, sensors, analytics, credits and reports
//! - Realtime updates over a WebSocket channel
//! - Tagged errors separating transport and HTTP failures
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use carbonlink::{ApiClient, ClientConfig, Filters, FileTokenStore, Unit};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::new("http://localhost:8000/api")?;
//! let client = ApiClient::new(config, Arc::new(FileTokenStore::default_location()))?;
//!
//! let active: Vec<Unit> = client
//!     .list_units(&Filters::new().with("status", "active"))
//!     .await?;
//! println!("{} active units", active.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod network;
pub mod storage;

// Re-export commonly used types
pub use config::{ClientConfig, FileConfig, Overrides};
pub use error::{ApiError, ApiResult, ConfigError, ErrorKind, StoreError};
pub use models::{
    AuthSession, CarbonCredit, Credentials, Header, HttpMethod, MintRequest, ModelHealth,
    RegisterRequest, RetireRequest, Sensor, SensorReading, TransferRequest, Unit, User,
};
pub use network::{realtime_url, ApiClient, ApiRequest, Filters, RealtimeChannel};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};

//! Network layer - API requests and the realtime WebSocket channel
//!
//! [`ApiClient`] owns the single request primitive; the domain methods and
//! the realtime subscription are layered on top of it.

pub mod api;
pub mod client;
pub mod request;
pub mod routes;
pub mod websocket;

pub use client::ApiClient;
pub use request::{ApiRequest, Filters};
pub use websocket::{realtime_url, RealtimeChannel};

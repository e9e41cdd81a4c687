//! HTTP/JSON surface for ClubGest.
//!
//! Owns transport concerns only: config loading, routing, strict input
//! decoding and status-code mapping. Domain rules live in `clubgest_core`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod request;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ConfigError, DbConfig, LogConfig, ServerConfig, DEFAULT_CONFIG_PATH};
pub use error::ApiError;
pub use handlers::dispatch;
pub use server::serve;
pub use state::{AppState, StateError};

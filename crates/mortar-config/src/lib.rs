//! Typed configuration for Mortar servers.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`PREFIX__SECTION__KEY`)
//! - `.env` loading through `dotenvy`
//! - Strict validation (fails on unknown fields)
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! version = "v0.1.0"
//! body_read_timeout_ms = 30000
//!
//! [logging]
//! enabled = true
//! level = "info"      # debug, info, warning, error, critical
//! format = "json"     # json or pretty
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::MortarConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, ServerConfig};

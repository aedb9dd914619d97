//! Structured logging for Mortar.
//!
//! - [`init_logging`] installs a `tracing-subscriber` pipeline with JSON or
//!   pretty output and an `EnvFilter` built from a level name.
//! - [`ContextFields`] renders the ordered fields of any
//!   [`LogContext`](mortar_core::LogContext) as one JSON object.
//! - The [`ctx_debug!`], [`ctx_info!`], [`ctx_warn!`] and [`ctx_error!`]
//!   macros emit events with those fields attached under `fields`.
//!
//! # Example
//!
//! ```rust
//! use mortar_core::RequestContext;
//! use mortar_telemetry::ctx_info;
//!
//! let ctx = RequestContext::mock();
//! ctx.set_user("alice");
//! ctx_info!(&ctx, "item created");
//! ```

#![doc(html_root_url = "https://docs.rs/mortar-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fields;
pub mod logging;

pub use error::TelemetryError;
pub use fields::ContextFields;
pub use logging::{init_logging, LogConfig, LogLevel};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[doc(hidden)]
pub use tracing as __tracing;

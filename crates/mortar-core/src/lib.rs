//! # Mortar Core
//!
//! Core types shared by every Mortar crate:
//!
//! - [`ApiError`] / [`StatefulError`] - registry-backed failure descriptions
//! - [`ErrorRegistry`] - the startup-built table of error templates
//! - [`Exchange`] - the host transport's per-request handle
//! - [`RequestContext`] - per-request carrier with a log-field bag and identity lookup
//! - [`RouteInfo`] - registration-time description of a route, used for logging

#![doc(html_root_url = "https://docs.rs/mortar-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod exchange;
pub mod registry;

pub use context::{LogContext, RequestContext, RequestId, RouteInfo, USER_FIELD};
pub use error::{ApiError, ErrorBody, ErrorEnvelope, StatefulError};
pub use exchange::{Exchange, ExchangeBuilder, PathParams};
pub use registry::{ErrorRegistry, RegistryError};

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

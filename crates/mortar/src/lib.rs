//! # Mortar
//!
//! Register ordinary async functions as HTTP handlers. Mortar decodes request
//! data into typed parameters, calls the function, and writes exactly one
//! response: the serialised result, or an error envelope
//! `{"code", "errors": {"message", "details"}}`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mortar::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct CreateItemRequest {
//!     name: String,
//! }
//!
//! impl RequestParam for CreateItemRequest {
//!     const CAPABILITIES: Capabilities = Capabilities::JSON;
//! }
//!
//! #[derive(Serialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Item {
//!     #[serde(rename = "ID")]
//!     id: u64,
//!     name: String,
//! }
//!
//! async fn create_item(_ctx: RequestContext, req: CreateItemRequest) -> ApiResult<Item> {
//!     Ok(Item { id: 1, name: req.name })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("MORTAR").load()?;
//!     init_logging(&LogConfig::from(&config.logging))?;
//!
//!     let mut server = Server::from_config(&config);
//!     server.group("/api", |api: &mut RouteGroup<'_>| {
//!         api.post("/items", create_item);
//!     });
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request lifecycle
//!
//! ```text
//! route match → middleware chain → bind parameters → handler → response
//!                     ↓                    ↓             ↓
//!                 error envelope ← ← ← ← ← ← ← ← ← ← ← ← ┘ (or panic)
//! ```
//!
//! Parameters are bound in a fixed order: `Default` and
//! [`RequestParam::fill_defaults`](mortar_extract::RequestParam::fill_defaults),
//! then JSON body, query or form, path, header, then
//! [`RequestParam::post_validate`](mortar_extract::RequestParam::post_validate).

#![doc(html_root_url = "https://docs.rs/mortar/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use mortar_core as core;

// Re-export the binder
pub use mortar_extract as extract;

// Re-export registration and serving
pub use mortar_server as server;

// Re-export logging
pub use mortar_telemetry as telemetry;

// Re-export configuration
pub use mortar_config as config;

/// Prelude module for convenient imports.
///
/// ```rust
/// use mortar::prelude::*;
/// ```
pub mod prelude {
    pub use mortar_core::{
        ApiError, ApiResult, ErrorRegistry, LogContext, RequestContext, RouteInfo, StatefulError,
    };

    pub use mortar_extract::{Capabilities, RequestParam};

    pub use mortar_server::{
        GroupRouter, Handler, Middleware, RegistrationError, RouteGroup, Server, ServerError,
        ShutdownSignal,
    };

    pub use mortar_telemetry::{ctx_debug, ctx_error, ctx_info, ctx_warn, init_logging, LogConfig};

    pub use mortar_config::{ConfigLoader, MortarConfig};
}

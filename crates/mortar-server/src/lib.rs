//! # Mortar Server
//!
//! Turns ordinary async functions into HTTP endpoints:
//!
//! - [`Handler`] / [`Middleware`] - the shape a registrable function must have
//! - [`HandlerSpec`] and [`validate`] - registration-time shape checks
//! - [`RouteGroup`] - hierarchical prefixes with `get`/`post`/.../`middleware`
//! - [`Server`] - in-memory dispatch and the HTTP/1.1 listen loop
//!
//! Every request runs its route's middleware chain and then the handler
//! inside one recovery boundary, so exactly one response is written whether
//! the handler returns, fails to bind, or panics.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mortar_core::{ApiError, RequestContext};
//! use mortar_server::Server;
//!
//! async fn health(_ctx: RequestContext) -> Result<&'static str, ApiError> {
//!     Ok("ok")
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::default();
//!     server.router().get("/health", health);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/mortar-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod group;
mod handler;
mod handler_spec;
mod invoke;
mod path;
mod respond;
mod routes;
mod server;
mod shutdown;
mod validate;

pub use error::{RegistrationError, ServerError};
pub use group::{GroupNode, GroupRouter, RouteGroup};
pub use handler::{BoxFuture, Handler, Middleware};
pub use handler_spec::{HandlerKind, HandlerSpec, MIDDLEWARE_METHOD};
pub use respond::{error_response, HttpResponse};
pub use server::Server;
pub use shutdown::ShutdownSignal;
pub use validate::validate;

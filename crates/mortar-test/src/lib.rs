//! # Mortar Test
//!
//! In-memory HTTP testing for Mortar servers. Requests are dispatched straight
//! into [`Server::handle`](mortar_server::Server::handle): no socket, same
//! route matching, middleware, binding and response mapping.
//!
//! ## Example
//!
//! ```rust
//! use mortar_core::{ApiError, RequestContext};
//! use mortar_server::Server;
//! use mortar_test::TestClient;
//! use serde_json::json;
//!
//! async fn ping(_ctx: RequestContext) -> Result<serde_json::Value, ApiError> {
//!     Ok(json!({"pong": true}))
//! }
//!
//! # tokio_test::block_on(async {
//! let mut server = Server::default();
//! server.router().get("/ping", ping);
//!
//! let client = TestClient::new(server);
//! client
//!     .get("/ping")
//!     .send()
//!     .await
//!     .assert_success()
//!     .assert_json(&json!({"pong": true}));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/mortar-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{ClientRequest, TestClient};
pub use error::TestError;
pub use request::TestRequest;
pub use response::TestResponse;

//! # Mortar Extract
//!
//! Capability-driven binding of request data into typed handler parameters.
//!
//! A parameter type opts into the request sources it is decoded from by
//! implementing [`RequestParam`] and declaring its [`Capabilities`]:
//!
//! | Capability | Source | Failure tag |
//! |------------|--------|-------------|
//! | [`Capabilities::JSON`] | request body | `json` |
//! | [`Capabilities::QUERY_OR_FORM`] | query string or form body | `query or form` |
//! | [`Capabilities::PATH`] | route template variables | `path` |
//! | [`Capabilities::HEADER`] | request headers | `header` |
//!
//! Binding always runs in the same order: defaults, body, query/form, path,
//! header, then post-validation. Each step only overwrites the fields its
//! source actually carries, so later steps override earlier ones.
//!
//! ## Example
//!
//! ```rust
//! use mortar_core::{ErrorRegistry, Exchange};
//! use mortar_extract::{bind, Capabilities, RequestParam};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct ListItems {
//!     limit: u32,
//!     tag: Option<String>,
//! }
//!
//! impl RequestParam for ListItems {
//!     const CAPABILITIES: Capabilities = Capabilities::QUERY_OR_FORM;
//!
//!     fn fill_defaults(&mut self) {
//!         self.limit = 20;
//!     }
//! }
//!
//! let exchange = Exchange::builder()
//!     .uri(http::Uri::from_static("/items?tag=red"))
//!     .build();
//!
//! let params: ListItems = bind(&exchange, &ErrorRegistry::new()).unwrap();
//! assert_eq!(params.limit, 20);
//! assert_eq!(params.tag.as_deref(), Some("red"));
//! ```

#![doc(html_root_url = "https://docs.rs/mortar-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod capability;
mod decode;
mod params;

pub use binder::bind;
pub use capability::{Capabilities, Source, POST_VALIDATOR_TAG};
pub use params::{ParamDescriptor, ParamKind, ParamList, RequestParam};

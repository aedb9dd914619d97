//! Handler and middleware traits.
//!
//! Any function or closure taking a [`RequestContext`] followed by up to
//! eight [`RequestParam`] values is a handler, as long as it returns a future
//! of `Result<T, E>` with `T: Serialize` and `E: StatefulError`. A function
//! whose future yields `Result<(), E>` can also be registered as middleware.
//!
//! The parameter shape (context first, owned value types after it) and the
//! error capability of the return type are checked by the compiler through
//! these bounds.
//!
//! # Example
//!
//! ```rust
//! use mortar_core::{ApiError, RequestContext};
//! use mortar_extract::{Capabilities, RequestParam};
//! use mortar_server::{Handler, Middleware};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct CreateItem {
//!     name: String,
//! }
//!
//! impl RequestParam for CreateItem {
//!     const CAPABILITIES: Capabilities = Capabilities::JSON;
//! }
//!
//! #[derive(Serialize)]
//! struct Item {
//!     id: u64,
//!     name: String,
//! }
//!
//! async fn create_item(_ctx: RequestContext, req: CreateItem) -> Result<Item, ApiError> {
//!     Ok(Item { id: 1, name: req.name })
//! }
//!
//! async fn audit(ctx: RequestContext) -> Result<(), ApiError> {
//!     ctx.set_field("audited", true);
//!     Ok(())
//! }
//!
//! fn assert_handler<H: Handler<A>, A>(_: H) {}
//! fn assert_middleware<M: Middleware<A>, A>(_: M) {}
//!
//! assert_handler(create_item);
//! assert_middleware(audit);
//! ```

use std::future::Future;
use std::pin::Pin;

use mortar_core::{RequestContext, StatefulError};
use mortar_extract::RequestParam;
use serde::Serialize;

/// A boxed, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A terminal handler taking the parameter tuple `Args`.
pub trait Handler<Args>: Clone + Send + Sync + 'static {
    /// Success value, serialised as the response body.
    type Output: Serialize + Send + 'static;

    /// Error value, mapped to the error envelope.
    type Error: StatefulError;

    /// Invokes the handler with bound arguments.
    fn call(&self, ctx: RequestContext, args: Args) -> BoxFuture<Result<Self::Output, Self::Error>>;
}

/// A middleware taking the parameter tuple `Args`.
///
/// An `Err` short-circuits the chain and becomes the response.
pub trait Middleware<Args>: Clone + Send + Sync + 'static {
    /// Error value, mapped to the error envelope.
    type Error: StatefulError;

    /// Invokes the middleware with bound arguments.
    fn call(&self, ctx: RequestContext, args: Args) -> BoxFuture<Result<(), Self::Error>>;
}

macro_rules! impl_handler {
    ($($T:ident),*) => {
        impl<F, Fut, Out, Err, $($T,)*> Handler<($($T,)*)> for F
        where
            F: Fn(RequestContext, $($T,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Result<Out, Err>> + Send + 'static,
            Out: Serialize + Send + 'static,
            Err: StatefulError,
            $($T: RequestParam,)*
        {
            type Output = Out;
            type Error = Err;

            #[allow(non_snake_case)]
            fn call(&self, ctx: RequestContext, ($($T,)*): ($($T,)*)) -> BoxFuture<Result<Out, Err>> {
                Box::pin((self)(ctx, $($T,)*))
            }
        }

        impl<F, Fut, Err, $($T,)*> Middleware<($($T,)*)> for F
        where
            F: Fn(RequestContext, $($T,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Result<(), Err>> + Send + 'static,
            Err: StatefulError,
            $($T: RequestParam,)*
        {
            type Error = Err;

            #[allow(non_snake_case)]
            fn call(&self, ctx: RequestContext, ($($T,)*): ($($T,)*)) -> BoxFuture<Result<(), Err>> {
                Box::pin((self)(ctx, $($T,)*))
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

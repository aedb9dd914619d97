//! Registration-time description of a handler.

use std::sync::Arc;

use http::Method;
use mortar_core::RouteInfo;
use mortar_extract::{ParamDescriptor, ParamKind};

/// Method tag recorded for middleware registrations.
pub const MIDDLEWARE_METHOD: &str = "USE";

/// Whether a registration ends the chain or runs ahead of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Produces the response body; returns `(output, error)`.
    Terminal,
    /// Runs before the terminal handler; returns only an error.
    Middleware,
}

impl HandlerKind {
    /// Number of values a handler of this kind returns.
    #[must_use]
    pub const fn return_arity(self) -> usize {
        match self {
            Self::Terminal => 2,
            Self::Middleware => 1,
        }
    }

    /// Lowercase name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terminal => "handler",
            Self::Middleware => "middleware",
        }
    }
}

/// Immutable description of one registration.
///
/// `params[0]` is the request context; the rest are bound value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    method: String,
    path: String,
    handler_name: &'static str,
    params: Vec<ParamDescriptor>,
    kind: HandlerKind,
    return_arity: usize,
}

impl HandlerSpec {
    /// Describes a terminal route.
    #[must_use]
    pub fn terminal(
        method: &Method,
        path: impl Into<String>,
        handler_name: &'static str,
        values: Vec<ParamDescriptor>,
    ) -> Self {
        Self::from_parts(
            method.as_str(),
            path,
            handler_name,
            with_context(values),
            HandlerKind::Terminal,
            HandlerKind::Terminal.return_arity(),
        )
    }

    /// Describes a middleware registered on the group at `prefix`.
    #[must_use]
    pub fn middleware(
        prefix: impl Into<String>,
        handler_name: &'static str,
        values: Vec<ParamDescriptor>,
    ) -> Self {
        Self::from_parts(
            MIDDLEWARE_METHOD,
            prefix,
            handler_name,
            with_context(values),
            HandlerKind::Middleware,
            HandlerKind::Middleware.return_arity(),
        )
    }

    /// Builds a spec from raw parts, without any check.
    ///
    /// Registration always goes through [`validate`](crate::validate).
    #[must_use]
    pub fn from_parts(
        method: impl Into<String>,
        path: impl Into<String>,
        handler_name: &'static str,
        params: Vec<ParamDescriptor>,
        kind: HandlerKind,
        return_arity: usize,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            handler_name,
            params,
            kind,
            return_arity,
        }
    }

    /// HTTP method, or [`MIDDLEWARE_METHOD`].
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Fully qualified path (group prefix plus local path).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Rust name of the registered function.
    #[must_use]
    pub fn handler_name(&self) -> &'static str {
        self.handler_name
    }

    /// Parameter descriptors, context first.
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Registration kind.
    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Declared return arity.
    #[must_use]
    pub fn return_arity(&self) -> usize {
        self.return_arity
    }

    /// Value parameters, i.e. everything after the context slot.
    pub fn values(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.params.iter().filter(|p| p.kind == ParamKind::Value)
    }

    /// Logging context for this registration.
    #[must_use]
    pub fn route_info(&self) -> Arc<RouteInfo> {
        Arc::new(RouteInfo::new(&self.method, &self.path, self.handler_name))
    }
}

fn with_context(values: Vec<ParamDescriptor>) -> Vec<ParamDescriptor> {
    let mut params = Vec::with_capacity(values.len() + 1);
    params.push(ParamDescriptor::context());
    params.extend(values);
    params
}

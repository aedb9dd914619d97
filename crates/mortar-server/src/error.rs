//! Server error types.

use thiserror::Error;

/// A configuration error detected while registering a handler.
///
/// Every variant means the binary is misconfigured. The panicking
/// registration methods abort startup with the same message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// The handler declares no parameters at all.
    #[error("{handler}: handler must take the request context as its first parameter")]
    MissingContext {
        /// Handler name.
        handler: String,
    },

    /// Parameter 0 is not the request context.
    #[error("{handler}: parameter 0 must be the request context, found {found}")]
    FirstParamNotContext {
        /// Handler name.
        handler: String,
        /// Type found in position 0.
        found: String,
    },

    /// A parameter after position 0 is not a bound value type.
    #[error("{handler}: parameter {index} ({type_name}) must be a bound value type")]
    NonValueParam {
        /// Handler name.
        handler: String,
        /// Parameter position.
        index: usize,
        /// Offending type.
        type_name: String,
    },

    /// Return arity does not match the registration kind.
    #[error("{handler}: a {kind} must return {expected} value(s), found {found}")]
    ReturnArity {
        /// Handler name.
        handler: String,
        /// `handler` or `middleware`.
        kind: &'static str,
        /// Arity required by the kind.
        expected: usize,
        /// Arity declared.
        found: usize,
    },

    /// The route template is malformed.
    #[error("invalid route path '{path}': {reason}")]
    InvalidPath {
        /// The template.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A parameter reads path variables but the template declares none.
    #[error("{method} {path}: parameter {type_name} reads path variables but the route has none")]
    PathCapabilityWithoutVariables {
        /// Route method.
        method: String,
        /// Route template.
        path: String,
        /// Offending parameter type.
        type_name: String,
    },

    /// The `(method, path)` pair is already taken.
    #[error("{method} {path} is already registered")]
    DuplicateRoute {
        /// Route method.
        method: String,
        /// Route template.
        path: String,
    },
}

/// Errors raised while serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address is invalid or could not be bound.
    #[error("failed to bind: {0}")]
    Bind(String),

    /// I/O error on the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

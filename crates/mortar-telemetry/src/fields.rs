//! Context-field rendering and the `ctx_*` log macros.

use std::fmt;

use mortar_core::LogContext;
use serde_json::Value;

/// Ordered log fields rendered as one JSON object.
///
/// Duplicate keys are kept in insertion order.
///
/// ```
/// use mortar_core::RouteInfo;
/// use mortar_telemetry::ContextFields;
///
/// let route = RouteInfo::new(http::Method::GET, "/items", "list_items");
/// assert_eq!(
///     ContextFields::new(&route).to_string(),
///     r#"{"method":"GET","url":"/items","handler":"list_items"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ContextFields(Vec<(String, Value)>);

impl ContextFields {
    /// Snapshots the fields of `ctx`.
    #[must_use]
    pub fn new<C: LogContext + ?Sized>(ctx: &C) -> Self {
        Self(ctx.log_fields())
    }

    /// The captured fields.
    #[must_use]
    pub fn as_slice(&self) -> &[(String, Value)] {
        &self.0
    }
}

impl fmt::Display for ContextFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", Value::String(key.clone()), value)?;
        }
        f.write_str("}")
    }
}

/// Emits a `debug` event with the context's fields attached.
#[macro_export]
macro_rules! ctx_debug {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::__tracing::debug!(fields = %$crate::ContextFields::new($ctx), $($arg)+)
    };
}

/// Emits an `info` event with the context's fields attached.
#[macro_export]
macro_rules! ctx_info {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::__tracing::info!(fields = %$crate::ContextFields::new($ctx), $($arg)+)
    };
}

/// Emits a `warn` event with the context's fields attached.
#[macro_export]
macro_rules! ctx_warn {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::__tracing::warn!(fields = %$crate::ContextFields::new($ctx), $($arg)+)
    };
}

/// Emits an `error` event with the context's fields attached.
#[macro_export]
macro_rules! ctx_error {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::__tracing::error!(fields = %$crate::ContextFields::new($ctx), $($arg)+)
    };
}

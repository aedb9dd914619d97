//! Error model for Mortar.
//!
//! Every failure that reaches a client is described by a *stateful error*: a
//! transport status, a stable machine-readable code, a human message and
//! optional structured details. [`ApiError`] is the concrete value type; the
//! [`StatefulError`] trait is the capability surface the response mapper
//! relies on.
//!
//! # Wire format
//!
//! ```json
//! {"code": 3, "errors": {"message": "failed to parse request", "details": "..."}}
//! ```

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Capability surface required of any error a handler or middleware returns.
///
/// # Example
///
/// ```
/// use mortar_core::{ErrorRegistry, StatefulError};
///
/// let registry = ErrorRegistry::new();
/// let err = registry.parse_request().with_details("bad input");
///
/// assert_eq!(err.status().as_u16(), 400);
/// assert_eq!(err.code(), 3);
/// assert_eq!(err.to_string(), "400//3: failed to parse request");
/// ```
pub trait StatefulError: std::error::Error + Send + Sync + 'static {
    /// Transport-level outcome code.
    fn status(&self) -> StatusCode;

    /// Stable machine-readable identifier.
    fn code(&self) -> i32;

    /// Human-readable message.
    fn message(&self) -> &str;

    /// Optional structured payload attached to this occurrence.
    fn details(&self) -> Option<&Value>;

    /// Builds the serialisable response body for this error.
    fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.code(),
            errors: ErrorBody {
                message: self.message().to_string(),
                details: self.details().cloned(),
            },
        }
    }
}

/// A registry-backed error value.
///
/// Templates are created through [`ErrorRegistry::define`](crate::ErrorRegistry::define);
/// per-occurrence details are attached with [`ApiError::with_details`], which
/// copies the template instead of mutating it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: StatusCode,
    code: i32,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, code: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Returns a copy of this error with `details` replaced.
    ///
    /// The receiver is left untouched, so registry templates stay detail-free.
    ///
    /// ```
    /// use mortar_core::{ErrorRegistry, StatefulError};
    ///
    /// let registry = ErrorRegistry::new();
    /// let template = registry.parse_request();
    /// let occurrence = template.with_details(serde_json::json!({"field": "name"}));
    ///
    /// assert!(template.details().is_none());
    /// assert_eq!(occurrence.details().unwrap()["field"], "name");
    /// ```
    #[must_use]
    pub fn with_details(&self, details: impl Into<Value>) -> Self {
        Self {
            details: Some(details.into()),
            ..self.clone()
        }
    }

    /// Returns `true` if this error carries the same code as `other`.
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl StatefulError for ApiError {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn code(&self) -> i32 {
        self.code
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}//{}: {}", self.status.as_u16(), self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_envelope().serialize(serializer)
    }
}

/// Serialisable error body written for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error's stable code.
    pub code: i32,
    /// Message and details.
    pub errors: ErrorBody,
}

/// Inner part of an [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub message: String,
    /// Structured details, serialised as `null` when absent.
    pub details: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn template() -> ApiError {
        ApiError::new(StatusCode::CONFLICT, 42, "already exists")
    }

    #[test]
    fn test_display_combines_status_code_and_message() {
        assert_eq!(template().to_string(), "409//42: already exists");
    }

    #[test]
    fn test_serializes_to_envelope() {
        let value = serde_json::to_value(template()).unwrap();
        assert_eq!(
            value,
            json!({"code": 42, "errors": {"message": "already exists", "details": null}})
        );
    }

    #[test]
    fn test_with_details_serialization() {
        let err = template().with_details(json!({"id": 7}));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({"code": 42, "errors": {"message": "already exists", "details": {"id": 7}}})
        );
    }

    #[test]
    fn test_with_details_replaces_previous_details() {
        let err = template().with_details("first").with_details("second");
        assert_eq!(err.details(), Some(&json!("second")));
    }

    #[test]
    fn test_envelope_round_trips() {
        let envelope = template().with_details("x").to_envelope();
        let text = serde_json::to_string(&envelope).unwrap();
        let back: ErrorEnvelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn test_is_compares_codes() {
        let a = template();
        let b = a.with_details("anything");
        assert!(a.is(&b));
    }

    proptest! {
        #[test]
        fn with_details_never_touches_template(details in ".*", code in 1i32..10_000) {
            let original = ApiError::new(StatusCode::BAD_REQUEST, code, "template");
            let attached = original.with_details(details.clone());

            prop_assert_eq!(attached.status(), original.status());
            prop_assert_eq!(attached.code(), original.code());
            prop_assert_eq!(attached.message(), original.message());
            prop_assert_eq!(attached.details(), Some(&Value::String(details)));
            prop_assert!(original.details().is_none());
        }
    }
}

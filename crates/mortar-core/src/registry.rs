//! The error template registry.
//!
//! An [`ErrorRegistry`] is built once at startup, then frozen by moving it
//! into the server (behind an `Arc`). Codes are unique across the registry.
//!
//! Three well-known templates are always present:
//!
//! | Code | Status | Message |
//! |------|--------|---------|
//! | [`codes::UNKNOWN`] | 500 | `unknown error` |
//! | [`codes::NOT_IMPLEMENTED`] | 400 | `not implemented` |
//! | [`codes::PARSE_REQUEST`] | 400 | `failed to parse request` |

use std::collections::BTreeMap;

use http::StatusCode;
use thiserror::Error;

use crate::{ApiError, StatefulError};

/// Codes of the pre-registered templates.
pub mod codes {
    /// Generic internal failure.
    pub const UNKNOWN: i32 = 1;
    /// Operation not implemented.
    pub const NOT_IMPLEMENTED: i32 = 2;
    /// Request data could not be decoded or validated.
    pub const PARSE_REQUEST: i32 = 3;
}

/// Errors raised while building the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The code is already taken by another template.
    #[error("error code {code} is already registered as '{existing}'")]
    DuplicateCode {
        /// The conflicting code.
        code: i32,
        /// Message of the template already holding the code.
        existing: String,
    },
}

/// Lookup table of error templates keyed by code.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use mortar_core::{ErrorRegistry, StatefulError};
///
/// let mut registry = ErrorRegistry::new();
/// let not_found = registry.define(StatusCode::NOT_FOUND, 100, "item not found");
///
/// assert_eq!(registry.get(100), Some(&not_found));
/// assert!(registry.try_define(StatusCode::GONE, 100, "gone").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ErrorRegistry {
    templates: BTreeMap<i32, ApiError>,
    unknown: ApiError,
    not_implemented: ApiError,
    parse_request: ApiError,
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorRegistry {
    /// Creates a registry holding only the well-known templates.
    #[must_use]
    pub fn new() -> Self {
        let unknown = ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::UNKNOWN,
            "unknown error",
        );
        let not_implemented =
            ApiError::new(StatusCode::BAD_REQUEST, codes::NOT_IMPLEMENTED, "not implemented");
        let parse_request = ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::PARSE_REQUEST,
            "failed to parse request",
        );

        let templates = [&unknown, &not_implemented, &parse_request]
            .into_iter()
            .map(|e| (e.code(), e.clone()))
            .collect();

        Self {
            templates,
            unknown,
            not_implemented,
            parse_request,
        }
    }

    /// Registers a new template.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCode`] if `code` is taken.
    pub fn try_define(
        &mut self,
        status: StatusCode,
        code: i32,
        message: impl Into<String>,
    ) -> Result<ApiError, RegistryError> {
        if let Some(existing) = self.templates.get(&code) {
            return Err(RegistryError::DuplicateCode {
                code,
                existing: existing.message().to_string(),
            });
        }

        let template = ApiError::new(status, code, message);
        self.templates.insert(code, template.clone());
        Ok(template)
    }

    /// Registers a new template, aborting startup on a duplicate code.
    ///
    /// # Panics
    ///
    /// Panics if `code` is already registered. A duplicate code means the
    /// binary is misconfigured and must not serve traffic.
    pub fn define(&mut self, status: StatusCode, code: i32, message: impl Into<String>) -> ApiError {
        match self.try_define(status, code, message) {
            Ok(template) => template,
            Err(e) => panic!("invalid error registry: {e}"),
        }
    }

    /// Looks up a template by code.
    #[must_use]
    pub fn get(&self, code: i32) -> Option<&ApiError> {
        self.templates.get(&code)
    }

    /// Returns `true` if `code` is registered.
    #[must_use]
    pub fn contains(&self, code: i32) -> bool {
        self.templates.contains_key(&code)
    }

    /// Number of registered templates, including the well-known ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Always `false`: the well-known templates are never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterates templates in code order.
    pub fn iter(&self) -> impl Iterator<Item = &ApiError> {
        self.templates.values()
    }

    /// The generic internal-failure template.
    #[must_use]
    pub fn unknown(&self) -> ApiError {
        self.unknown.clone()
    }

    /// The "not implemented" template.
    #[must_use]
    pub fn not_implemented(&self) -> ApiError {
        self.not_implemented.clone()
    }

    /// The template used for every request decode failure.
    #[must_use]
    pub fn parse_request(&self) -> ApiError {
        self.parse_request.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_known_templates() {
        let registry = ErrorRegistry::new();
        assert_eq!(registry.len(), 3);

        let unknown = registry.unknown();
        assert_eq!(unknown.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(unknown.code(), codes::UNKNOWN);
        assert_eq!(unknown.message(), "unknown error");

        let not_implemented = registry.not_implemented();
        assert_eq!(not_implemented.status(), StatusCode::BAD_REQUEST);
        assert_eq!(not_implemented.code(), codes::NOT_IMPLEMENTED);

        let parse = registry.parse_request();
        assert_eq!(parse.status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse.code(), codes::PARSE_REQUEST);
        assert_eq!(parse.message(), "failed to parse request");
    }

    #[test]
    fn test_define_and_lookup() {
        let mut registry = ErrorRegistry::new();
        let err = registry.define(StatusCode::NOT_FOUND, 404, "item not found");

        assert!(registry.contains(404));
        assert_eq!(registry.get(404), Some(&err));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut registry = ErrorRegistry::new();
        let result = registry.try_define(StatusCode::BAD_REQUEST, codes::PARSE_REQUEST, "dup");

        assert_eq!(
            result,
            Err(RegistryError::DuplicateCode {
                code: codes::PARSE_REQUEST,
                existing: "failed to parse request".to_string(),
            })
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_define_panics_on_duplicate() {
        let mut registry = ErrorRegistry::new();
        registry.define(StatusCode::BAD_REQUEST, 10, "first");
        registry.define(StatusCode::BAD_REQUEST, 10, "second");
    }

    #[test]
    fn test_attaching_details_leaves_registry_entry_detail_free() {
        let mut registry = ErrorRegistry::new();
        let template = registry.define(StatusCode::UNPROCESSABLE_ENTITY, 20, "invalid item");

        let occurrence = template.with_details(json!({"field": "name"}));
        assert_eq!(
            serde_json::to_value(&occurrence).unwrap(),
            json!({"code": 20, "errors": {"message": "invalid item", "details": {"field": "name"}}})
        );
        assert!(registry.get(20).unwrap().details().is_none());
    }

    #[test]
    fn test_iter_in_code_order() {
        let mut registry = ErrorRegistry::new();
        registry.define(StatusCode::CONFLICT, 50, "conflict");
        registry.define(StatusCode::GONE, 30, "gone");

        let codes: Vec<i32> = registry.iter().map(StatefulError::code).collect();
        assert_eq!(codes, vec![1, 2, 3, 30, 50]);
    }
}

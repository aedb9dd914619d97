//! The capability binder.

use std::any::type_name;

use mortar_core::{ApiError, ErrorRegistry, Exchange, StatefulError};
use serde_json::{json, Value};

use crate::decode::{decode, seed};
use crate::{RequestParam, POST_VALIDATOR_TAG};

/// Binds a fresh `T` from `exchange`.
///
/// Steps run in a fixed order: `Default::default()`,
/// [`RequestParam::fill_defaults`], one decode step per declared capability
/// (json, query or form, path, header), then [`RequestParam::post_validate`].
/// Binding stops at the first failing step.
///
/// # Errors
///
/// - A decode failure returns the registry's parse-request template with
///   details `{"tag": <source tag>, "reason": <decode diagnostic>}`.
/// - A post-validation failure returns the validator's own error with details
///   `{"tag": "post validator error", "reason": <its original details>}`.
pub fn bind<T: RequestParam>(exchange: &Exchange, registry: &ErrorRegistry) -> Result<T, ApiError> {
    let mut value = T::default();
    value.fill_defaults();

    let mut sources = T::CAPABILITIES.sources().peekable();
    if sources.peek().is_some() {
        let mut acc = seed(&value).map_err(|reason| {
            tracing::error!(param = type_name::<T>(), %reason, "failed to seed parameter defaults");
            registry.unknown()
        })?;

        for source in sources {
            let tag = source.tag();
            let layer = decode::<T>(source, exchange)
                .map_err(|reason| decode_failure(registry, tag, reason))?;
            layer.overlay(&mut acc);
            value = serde_json::from_value(acc.clone())
                .map_err(|e| decode_failure(registry, tag, e.to_string()))?;
        }
    }

    value.post_validate().map_err(|e| {
        let reason = e.details().cloned().unwrap_or(Value::Null);
        e.with_details(json!({ "tag": POST_VALIDATOR_TAG, "reason": reason }))
    })?;

    tracing::debug!(
        param = type_name::<T>(),
        capabilities = ?T::CAPABILITIES,
        "bound request parameter"
    );
    Ok(value)
}

fn decode_failure(registry: &ErrorRegistry, tag: &str, reason: String) -> ApiError {
    tracing::debug!(tag, %reason, "request parameter decode failed");
    registry
        .parse_request()
        .with_details(json!({ "tag": tag, "reason": reason }))
}

//! Response mapping.
//!
//! Success bodies are the handler output serialised as JSON with status 200.
//! Failures are the error envelope `{"code", "errors": {"message", "details"}}`
//! with the status carried by the error.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use http_body_util::Full;
use mortar_core::{ErrorRegistry, StatefulError};
use serde::Serialize;

/// The response type produced by the server.
pub type HttpResponse = Response<Full<Bytes>>;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// Body used if an error envelope itself fails to serialise.
const FALLBACK_ENVELOPE: &[u8] = br#"{"code":1,"errors":{"message":"unknown error","details":null}}"#;

/// Maps an error to its envelope response.
pub fn error_response<E: StatefulError + ?Sized>(err: &E) -> HttpResponse {
    let body = serde_json::to_vec(&err.to_envelope())
        .map_or_else(|_| Bytes::from_static(FALLBACK_ENVELOPE), Bytes::from);
    build(err.status(), JSON, body)
}

/// Serialises a handler output, or maps the failure to the unknown-error
/// template.
pub(crate) fn success_response<T: Serialize + ?Sized>(
    output: &T,
    registry: &ErrorRegistry,
) -> Result<HttpResponse, mortar_core::ApiError> {
    match serde_json::to_vec(output) {
        Ok(body) => Ok(build(StatusCode::OK, JSON, Bytes::from(body))),
        Err(e) => Err(registry.unknown().with_details(e.to_string())),
    }
}

/// A plain-text host reply, outside the error envelope.
pub(crate) fn plain(status: StatusCode, text: &'static str) -> HttpResponse {
    build(status, TEXT, Bytes::from_static(text.as_bytes()))
}

fn build(status: StatusCode, content_type: &'static str, body: Bytes) -> HttpResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_response_envelope() {
        let registry = ErrorRegistry::new();
        let err = registry.parse_request().with_details(json!({"tag": "json"}));

        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON);
        assert_eq!(
            body_json(response).await,
            json!({"code": 3, "errors": {"message": "failed to parse request", "details": {"tag": "json"}}})
        );
    }

    #[tokio::test]
    async fn test_success_response() {
        let registry = ErrorRegistry::new();
        let response = success_response(&json!({"ID": 1}), &registry).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"ID": 1}));
    }

    #[test]
    fn test_unserialisable_output_maps_to_unknown() {
        let registry = ErrorRegistry::new();
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], 1);

        let err = success_response(&bad, &registry).unwrap_err();
        assert_eq!(err.code(), 1);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_plain_reply() {
        let response = plain(StatusCode::NOT_FOUND, "404 page not found");
        assert_eq!(response.headers()[CONTENT_TYPE], TEXT);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), b"404 page not found");
    }
}

//! Request context types.
//!
//! A [`RequestContext`] is created fresh for every inbound request and shared
//! by every middleware and the terminal handler of that request. It composes
//! the host [`Exchange`] with a bag of log-structured fields.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::Exchange;

/// Field key under which the caller identity is stored.
pub const USER_FIELD: &str = "user-id";

/// A source of ordered, structured log fields.
///
/// Log helpers attach these fields to every line they emit for a request.
pub trait LogContext {
    /// Returns the fields in the order they should appear.
    fn log_fields(&self) -> Vec<(String, Value)>;
}

/// A unique identifier for each request, using UUID v7.
///
/// ```
/// use mortar_core::RequestId;
///
/// let a = RequestId::new();
/// let b = RequestId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new time-ordered request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registration-time description of a route.
///
/// Shared by every request dispatched to the route and used as the logging
/// context while the route is being registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    method: String,
    path: String,
    handler: &'static str,
}

impl RouteInfo {
    /// Creates route info.
    #[must_use]
    pub fn new(method: impl AsRef<str>, path: impl Into<String>, handler: &'static str) -> Self {
        Self {
            method: method.as_ref().to_string(),
            path: path.into(),
            handler,
        }
    }

    /// HTTP method, or `USE` for a middleware registration.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Fully qualified route template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the registered handler function.
    #[must_use]
    pub fn handler(&self) -> &'static str {
        self.handler
    }
}

impl LogContext for RouteInfo {
    fn log_fields(&self) -> Vec<(String, Value)> {
        vec![
            ("method".to_string(), Value::from(self.method.as_str())),
            ("url".to_string(), Value::from(self.path.as_str())),
            ("handler".to_string(), Value::from(self.handler)),
        ]
    }
}

#[derive(Debug)]
struct Inner {
    request_id: RequestId,
    exchange: Exchange,
    route: Arc<RouteInfo>,
    fields: RwLock<Vec<(String, Value)>>,
    started_at: Instant,
}

/// Per-request carrier handed to every middleware and handler.
///
/// Cloning is cheap and yields a handle to the same request: a field set by a
/// middleware is visible to the handler that runs after it.
///
/// # Example
///
/// ```
/// use mortar_core::RequestContext;
///
/// let ctx = RequestContext::mock();
/// ctx.set_user("u-1");
/// ctx.set_field("tenant", "acme");
///
/// assert_eq!(ctx.user().as_deref(), Some("u-1"));
/// assert_eq!(ctx.field("tenant"), Some(serde_json::json!("acme")));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<Inner>,
}

impl RequestContext {
    /// Creates a context for one inbound request.
    #[must_use]
    pub fn new(exchange: Exchange, route: Arc<RouteInfo>) -> Self {
        Self {
            inner: Arc::new(Inner {
                request_id: RequestId::new(),
                exchange,
                route,
                fields: RwLock::new(Vec::new()),
                started_at: Instant::now(),
            }),
        }
    }

    /// Creates a context around an empty `GET /` exchange, for tests.
    #[must_use]
    pub fn mock() -> Self {
        Self::new(
            Exchange::builder().build(),
            Arc::new(RouteInfo::new(Method::GET, "/", "mock")),
        )
    }

    /// The request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.inner.request_id
    }

    /// The underlying host exchange.
    #[must_use]
    pub fn exchange(&self) -> &Exchange {
        &self.inner.exchange
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        self.inner.exchange.method()
    }

    /// The concrete request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.inner.exchange.path()
    }

    /// The route this request was dispatched to.
    #[must_use]
    pub fn route(&self) -> &RouteInfo {
        &self.inner.route
    }

    /// Time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.inner.started_at.elapsed()
    }

    /// Appends a log field.
    ///
    /// Fields keep insertion order; setting a key twice appends a second
    /// entry and [`field`](Self::field) returns the latest one.
    pub fn set_field(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.fields.write().push((key.into(), value.into()));
    }

    /// Returns the latest value set for `key`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<Value> {
        self.inner
            .fields
            .read()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Snapshot of the user-set fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> Vec<(String, Value)> {
        self.inner.fields.read().clone()
    }

    /// The caller identity, if a middleware recorded one.
    #[must_use]
    pub fn user(&self) -> Option<String> {
        match self.field(USER_FIELD) {
            Some(Value::String(user)) => Some(user),
            _ => None,
        }
    }

    /// Records the caller identity.
    pub fn set_user(&self, user: impl Into<String>) {
        self.set_field(USER_FIELD, Value::String(user.into()));
    }
}

impl LogContext for RequestContext {
    fn log_fields(&self) -> Vec<(String, Value)> {
        let route = self.route();
        let mut fields = vec![
            (
                "request_id".to_string(),
                Value::String(self.request_id().to_string()),
            ),
            ("method".to_string(), Value::from(self.method().as_str())),
            ("path".to_string(), Value::from(self.path())),
            ("handler".to_string(), Value::from(route.handler())),
        ];
        fields.extend(self.fields());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Uri;
    use serde_json::json;

    fn ctx() -> RequestContext {
        let exchange = Exchange::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/api/items"))
            .build();
        RequestContext::new(
            exchange,
            Arc::new(RouteInfo::new(Method::POST, "/api/items", "create_item")),
        )
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let ctx = ctx();
        ctx.set_field("b", 2);
        ctx.set_field("a", 1);

        let keys: Vec<String> = ctx.fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_field_returns_latest_value() {
        let ctx = ctx();
        ctx.set_field("step", "one");
        ctx.set_field("step", "two");

        assert_eq!(ctx.field("step"), Some(json!("two")));
        assert_eq!(ctx.fields().len(), 2);
    }

    #[test]
    fn test_user_identity() {
        let ctx = ctx();
        assert_eq!(ctx.user(), None);

        ctx.set_user("alice");
        assert_eq!(ctx.user().as_deref(), Some("alice"));
    }

    #[test]
    fn test_non_string_user_field_is_ignored() {
        let ctx = ctx();
        ctx.set_field(USER_FIELD, 12);
        assert_eq!(ctx.user(), None);
    }

    #[test]
    fn test_clones_share_fields() {
        let ctx = ctx();
        let handle = ctx.clone();
        handle.set_field("seen", true);

        assert_eq!(ctx.field("seen"), Some(json!(true)));
        assert_eq!(ctx.request_id(), handle.request_id());
    }

    #[test]
    fn test_log_fields_prefix_then_user_fields() {
        let ctx = ctx();
        ctx.set_user("bob");

        let fields = ctx.log_fields();
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["request_id", "method", "path", "handler", USER_FIELD]);
        assert_eq!(fields[1].1, json!("POST"));
        assert_eq!(fields[2].1, json!("/api/items"));
        assert_eq!(fields[3].1, json!("create_item"));
    }

    #[test]
    fn test_route_info_log_fields() {
        let route = RouteInfo::new(Method::GET, "/v1/items/{id}", "get_item");
        let fields = route.log_fields();
        assert_eq!(fields[0], ("method".to_string(), json!("GET")));
        assert_eq!(fields[1], ("url".to_string(), json!("/v1/items/{id}")));
        assert_eq!(fields[2], ("handler".to_string(), json!("get_item")));
    }

    #[test]
    fn test_concurrent_reads_during_writes() {
        let ctx = ctx();
        let writer = ctx.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                writer.set_field("i", i);
            }
        });
        for _ in 0..100 {
            let _ = ctx.log_fields();
        }
        handle.join().unwrap();
        assert_eq!(ctx.fields().len(), 100);
    }
}

//! The host transport's per-request handle.
//!
//! An [`Exchange`] is everything the core needs to read from an inbound
//! request: method, URI, headers, the collected body and the path variables
//! captured by route matching. Decoding is done elsewhere (the capability
//! binder); this type only exposes accessors.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// Path variables captured by route matching, in template order.
///
/// ```
/// use mortar_core::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("id", "42");
///
/// assert_eq!(params.get("id"), Some("42"));
/// assert_eq!(params.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    inner: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value of a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if no variables were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of captured variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// Read-only view of one inbound request.
#[derive(Debug, Clone)]
pub struct Exchange {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: PathParams,
}

impl Exchange {
    /// Creates an exchange from its parts.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: PathParams,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
        }
    }

    /// Creates an exchange from a collected `http::Request`.
    #[must_use]
    pub fn from_request(request: http::Request<Bytes>, path_params: PathParams) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body, path_params)
    }

    /// Starts a builder, mostly useful in tests.
    #[must_use]
    pub fn builder() -> ExchangeBuilder {
        ExchangeBuilder::default()
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The raw query string, if any.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// All request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A single header as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }

    /// The collected request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Path variables captured by route matching, still percent-encoded.
    #[must_use]
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }
}

/// Builder for [`Exchange`]. Unset method and URI default to `GET /`.
#[derive(Debug, Default)]
pub struct ExchangeBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_params: PathParams,
}

impl ExchangeBuilder {
    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Adds a header; invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::HeaderName::try_from(name),
            http::HeaderValue::try_from(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a path variable.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Builds the exchange.
    #[must_use]
    pub fn build(self) -> Exchange {
        Exchange {
            method: self.method.unwrap_or(Method::GET),
            uri: self.uri.unwrap_or_else(|| Uri::from_static("/")),
            headers: self.headers,
            body: self.body,
            path_params: self.path_params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_accessors() {
        let exchange = Exchange::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/items/7?verbose=true"))
            .header("content-type", "application/json")
            .header("X-Trace", "abc")
            .body(r#"{"name":"x"}"#)
            .path_param("id", "7")
            .build();

        assert_eq!(exchange.method(), &Method::POST);
        assert_eq!(exchange.path(), "/items/7");
        assert_eq!(exchange.query_string(), Some("verbose=true"));
        assert_eq!(exchange.content_type(), Some("application/json"));
        assert_eq!(exchange.header("x-trace"), Some("abc"));
        assert_eq!(exchange.body().as_ref(), br#"{"name":"x"}"#);
        assert_eq!(exchange.path_params().get("id"), Some("7"));
    }

    #[test]
    fn test_builder_defaults() {
        let exchange = Exchange::builder().build();
        assert_eq!(exchange.method(), &Method::GET);
        assert_eq!(exchange.path(), "/");
        assert!(exchange.body().is_empty());
        assert!(exchange.path_params().is_empty());
    }

    #[test]
    fn test_from_request() {
        let request = http::Request::builder()
            .method(Method::PUT)
            .uri("/a/b")
            .header("x-user", "u1")
            .body(Bytes::from_static(b"hi"))
            .unwrap();

        let params: PathParams = vec![("b".to_string(), "b".to_string())].into_iter().collect();
        let exchange = Exchange::from_request(request, params);

        assert_eq!(exchange.method(), &Method::PUT);
        assert_eq!(exchange.header("x-user"), Some("u1"));
        assert_eq!(exchange.body().as_ref(), b"hi");
        assert_eq!(exchange.path_params().len(), 1);
    }

    #[test]
    fn test_path_params_iteration_order() {
        let mut params = PathParams::new();
        params.push("org", "acme");
        params.push("user", "1");

        let collected: Vec<_> = params.iter().collect();
        assert_eq!(collected, vec![("org", "acme"), ("user", "1")]);
    }
}

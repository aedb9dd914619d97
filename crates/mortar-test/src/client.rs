//! In-memory test client.

use bytes::Bytes;
use http::Method;
use mortar_server::Server;
use serde::Serialize;

use crate::error::TestError;
use crate::request::TestRequest;
use crate::response::TestResponse;

/// Sends requests straight into a [`Server`]'s dispatch, without a socket.
///
/// Requests go through route matching, the middleware chain, binding and the
/// response mapper exactly as they would over HTTP.
#[must_use]
pub struct TestClient {
    server: Server,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps a server whose routes are already registered.
    pub fn new(server: Server) -> Self {
        Self {
            server,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The wrapped server.
    #[must_use]
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> ClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> ClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> ClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, uri: impl AsRef<str>) -> ClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> ClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a HEAD request.
    pub fn head(&self, uri: impl AsRef<str>) -> ClientRequest<'_> {
        self.request(Method::HEAD, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> ClientRequest<'_> {
        let request = self
            .default_headers
            .iter()
            .fold(TestRequest::new(method, uri), |request, (name, value)| request.header(name, value));
        ClientRequest { client: self, request }
    }

    /// Sends a prepared request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the response body
    /// cannot be read.
    pub async fn send(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let response = self.server.handle(request.build()?).await;
        TestResponse::from_http(response).await
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
pub struct ClientRequest<'a> {
    client: &'a TestClient,
    request: TestRequest,
}

impl ClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.query(key, value);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request = self.request.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.request = self.request.json(value);
        self
    }

    /// Sets a form-encoded body.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.request = self.request.form(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request is malformed.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request, returning build and read failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the response body
    /// cannot be read.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        self.client.send(self.request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use mortar_core::{ApiError, RequestContext};
    use mortar_extract::{Capabilities, RequestParam};
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Echo {
        name: String,
        #[serde(rename = "x-tenant")]
        tenant: String,
    }

    impl RequestParam for Echo {
        const CAPABILITIES: Capabilities = Capabilities::QUERY_OR_FORM.union(Capabilities::HEADER);
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct EchoBody {
        name: String,
        #[serde(rename = "x-tenant")]
        tenant: String,
    }

    impl RequestParam for EchoBody {
        const CAPABILITIES: Capabilities = Capabilities::JSON.union(Capabilities::HEADER);
    }

    async fn echo(ctx: RequestContext, echo: Echo) -> Result<Value, ApiError> {
        Ok(json!({"method": ctx.method().as_str(), "name": echo.name, "tenant": echo.tenant}))
    }

    async fn echo_body(ctx: RequestContext, echo: EchoBody) -> Result<Value, ApiError> {
        Ok(json!({"method": ctx.method().as_str(), "name": echo.name, "tenant": echo.tenant}))
    }

    fn client() -> TestClient {
        let mut server = Server::default();
        server
            .router()
            .get("/echo", echo)
            .post("/echo", echo_body)
            .put("/echo", echo)
            .patch("/echo", echo)
            .delete("/echo", echo);
        TestClient::new(server)
    }

    #[tokio::test]
    async fn test_query_reaches_handler() {
        let response = client().get("/echo").query("name", "alice").send().await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json_value().unwrap()["name"], "alice");
    }

    #[tokio::test]
    async fn test_json_and_header() {
        let response = client()
            .post("/echo")
            .header("X-Tenant", "acme")
            .json(&json!({"name": "bob"}))
            .send()
            .await;
        response.assert_json(&json!({"method": "POST", "name": "bob", "tenant": "acme"}));
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = client().with_default_header("x-tenant", "globex");
        let response = client.put("/echo").send().await;
        assert_eq!(response.json_value().unwrap()["tenant"], "globex");
    }

    #[tokio::test]
    async fn test_methods() {
        let client = client();
        for (request, method) in [
            (client.patch("/echo"), "PATCH"),
            (client.delete("/echo"), "DELETE"),
        ] {
            let response = request.send().await;
            assert_eq!(response.json_value().unwrap()["method"], method);
        }

        client.head("/echo").send().await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let err = client().get("/echo").header("bad header", "x").try_send().await.unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }
}

//! End-to-end request scenarios through the in-memory test client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::StatusCode;
use mortar::prelude::*;
use mortar_test::TestClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CreateItemRequest {
    name: String,
}

impl RequestParam for CreateItemRequest {
    const CAPABILITIES: Capabilities = Capabilities::JSON;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Item {
    #[serde(rename = "ID")]
    id: u64,
    name: String,
}

/// A route whose handler counts its invocations.
fn counted_items(calls: &Arc<AtomicUsize>) -> Server {
    let calls = Arc::clone(calls);
    let mut server = Server::default();
    server.router().post("/items", move |_ctx: RequestContext, req: CreateItemRequest| {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ApiError>(Item { id: 1, name: req.name })
        }
    });
    server
}

#[tokio::test]
async fn create_item_returns_result_fields() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = TestClient::new(counted_items(&calls));

    client
        .post("/items")
        .json(&json!({"name": "x"}))
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_content_type("application/json")
        .assert_json(&json!({"ID": 1, "Name": "x"}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_body_is_parse_failure_without_invocation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = TestClient::new(counted_items(&calls));

    let response = client.post("/items").body("not-json").send().await;
    response.assert_status(StatusCode::BAD_REQUEST).assert_error_code(3);

    let body = response.json_value().unwrap();
    assert_eq!(body["errors"]["message"], "failed to parse request");
    assert_eq!(body["errors"]["details"]["tag"], "json");
    assert!(body["errors"]["details"]["reason"].as_str().unwrap().contains("expected"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ListItems {
    limit: u32,
    offset: u32,
}

impl RequestParam for ListItems {
    const CAPABILITIES: Capabilities = Capabilities::QUERY_OR_FORM.union(Capabilities::HEADER);

    fn fill_defaults(&mut self) {
        self.limit = 20;
    }

    fn post_validate(&self) -> Result<(), ApiError> {
        if self.limit > 100 {
            return Err(too_large().with_details(json!({"max": 100})));
        }
        Ok(())
    }
}

fn too_large() -> ApiError {
    let mut registry = ErrorRegistry::new();
    registry.define(StatusCode::UNPROCESSABLE_ENTITY, 1001, "limit too large")
}

fn list_server(calls: &Arc<AtomicUsize>) -> Server {
    let calls = Arc::clone(calls);
    let mut server = Server::default();
    server.router().get("/items", move |_ctx: RequestContext, query: ListItems| {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ApiError>(json!({"limit": query.limit, "offset": query.offset}))
        }
    });
    server
}

#[tokio::test]
async fn defaults_then_query_then_header() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = TestClient::new(list_server(&calls));

    client
        .get("/items")
        .send()
        .await
        .assert_json(&json!({"limit": 20, "offset": 0}));

    client
        .get("/items")
        .query("offset", "5")
        .send()
        .await
        .assert_json(&json!({"limit": 20, "offset": 5}));

    client
        .get("/items")
        .query("limit", "10")
        .header("limit", "30")
        .send()
        .await
        .assert_json(&json!({"limit": 30, "offset": 0}));
}

#[tokio::test]
async fn post_validate_rejection_skips_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = TestClient::new(list_server(&calls));

    let response = client.get("/items").query("limit", "500").send().await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json(&json!({
            "code": 1001,
            "errors": {
                "message": "limit too large",
                "details": {"tag": "post validator error", "reason": {"max": 100}}
            }
        }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn middleware_error_short_circuits_chain() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let registry = ErrorRegistry::new();
    let denied = registry.not_implemented();

    let mut server = Server::new(MortarConfig::default(), registry);
    server.group("/admin", move |admin: &mut RouteGroup<'_>| {
        admin.middleware(move |_ctx: RequestContext| {
            let denied = denied.clone();
            async move { Err::<(), _>(denied) }
        });
        admin.get("/stats", move |_ctx: RequestContext| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ApiError>(json!({}))
            }
        });
    });

    let client = TestClient::new(server);
    client
        .get("/admin/stats")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_json(&json!({"code": 2, "errors": {"message": "not implemented", "details": null}}));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

async fn whoami(ctx: RequestContext) -> ApiResult<Value> {
    Ok(json!({"user": ctx.user()}))
}

async fn authenticate(ctx: RequestContext) -> ApiResult<()> {
    ctx.set_user("alice");
    Ok(())
}

#[tokio::test]
async fn middleware_fields_reach_handler() {
    let mut server = Server::default();
    server.group("/me", |me: &mut RouteGroup<'_>| {
        me.middleware(authenticate);
        me.get("/", whoami);
    });

    TestClient::new(server)
        .get("/me")
        .send()
        .await
        .assert_json(&json!({"user": "alice"}));
}

async fn one(_ctx: RequestContext) -> ApiResult<u8> {
    Ok(1)
}

async fn two(_ctx: RequestContext) -> ApiResult<u8> {
    Ok(2)
}

#[tokio::test]
async fn same_prefix_twice_is_two_subtrees() {
    let mut server = Server::default();
    server.group("/v1", |v1: &mut RouteGroup<'_>| {
        v1.get("/one", one);
    });
    server.group("/v1", |v1: &mut RouteGroup<'_>| {
        v1.get("/two", two);
    });

    let tree = server.route_tree();
    let prefixes: Vec<&str> = tree.children().iter().map(|c| c.prefix()).collect();
    assert_eq!(prefixes, ["/v1", "/v1"]);

    let client = TestClient::new(server);
    client.get("/v1/one").send().await.assert_body_eq("1");
    client.get("/v1/two").send().await.assert_body_eq("2");
}

#[test]
#[should_panic(expected = "GET /v1/one is already registered")]
fn duplicate_route_aborts_registration() {
    let mut server = Server::default();
    server.group("/v1", |v1: &mut RouteGroup<'_>| {
        v1.get("/one", one);
    });
    server.group("/v1", |v1: &mut RouteGroup<'_>| {
        v1.get("/one", two);
    });
}

#[tokio::test]
async fn api_error_panic_becomes_that_error() {
    let mut server = Server::default();
    let not_implemented = server.registry().not_implemented();
    server.router().get("/todo", move |_ctx: RequestContext| {
        let err = not_implemented.clone();
        async move {
            if err.code() != 0 {
                std::panic::panic_any(err);
            }
            Ok::<_, ApiError>(())
        }
    });

    TestClient::new(server)
        .get("/todo")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code(2);
}

async fn explode(_ctx: RequestContext) -> ApiResult<()> {
    panic!("connection pool exhausted")
}

#[tokio::test]
async fn other_panic_is_unknown_error_without_leaking() {
    let mut server = Server::default();
    server.router().get("/explode", explode);

    let response = TestClient::new(server).get("/explode").send().await;
    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json(&json!({"code": 1, "errors": {"message": "unknown error", "details": null}}));
    assert!(!response.text().unwrap().contains("pool"));
}

#[tokio::test]
async fn version_route_reports_configured_version() {
    let mut config = MortarConfig::default();
    config.server.version = "v2.3.4".to_string();

    TestClient::new(Server::from_config(&config))
        .get("/version")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json(&json!({"version": "v2.3.4"}));
}

#[tokio::test]
async fn unknown_route_is_plain_not_found() {
    TestClient::new(Server::default())
        .get("/missing")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_content_type("text/plain")
        .assert_body_eq("404 page not found");
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OrgPath {
    org: String,
}

impl RequestParam for OrgPath {
    const CAPABILITIES: Capabilities = Capabilities::PATH;
}

#[test]
fn path_capability_requires_path_variables() {
    async fn handler(_ctx: RequestContext, _org: OrgPath) -> ApiResult<()> {
        Ok(())
    }

    let mut server = Server::default();
    let err = server.router().try_get("/orgs", handler).err().unwrap();
    assert!(matches!(err, RegistrationError::PathCapabilityWithoutVariables { .. }));
    assert!(server.router().try_get("/orgs/:org", handler).is_ok());
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NamePath {
    name: String,
}

impl RequestParam for NamePath {
    const CAPABILITIES: Capabilities = Capabilities::PATH;
}

async fn greet(_ctx: RequestContext, path: NamePath) -> ApiResult<Value> {
    Ok(json!({"name": path.name}))
}

#[tokio::test]
async fn path_variables_are_percent_decoded() {
    let mut server = Server::default();
    server.router().get("/users/{name}", greet);
    let client = TestClient::new(server);

    client
        .get("/users/hello%20world")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json(&json!({"name": "hello world"}));

    let response = client.get("/users/%FF").send().await;
    response.assert_status(StatusCode::BAD_REQUEST).assert_error_code(3);
    assert_eq!(response.json_value().unwrap()["errors"]["details"]["tag"], "path");
}

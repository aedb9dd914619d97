//! The server: route registration, in-memory dispatch and the HTTP/1.1
//! listen loop.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use mortar_config::MortarConfig;
use mortar_core::{ApiError, ErrorRegistry, Exchange, RequestContext};
use serde::Serialize;
use tokio::net::{TcpListener, TcpStream};

use crate::group::{GroupNode, GroupRouter, Registrar, RouteGroup};
use crate::invoke;
use crate::respond::{plain, HttpResponse};
use crate::{ServerError, ShutdownSignal};

/// Body of the built-in `GET /version` route.
#[derive(Debug, Serialize)]
struct VersionInfo {
    version: String,
}

/// A Mortar HTTP server.
///
/// Routes are registered through [`router`](Self::router) or
/// [`group`](Self::group) before the server starts. Once running, the route
/// table and error registry are shared read-only by every connection.
///
/// A built-in `GET /version` route reports the configured version.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use http::{Request, StatusCode};
/// use mortar_core::{ApiError, RequestContext};
/// use mortar_server::Server;
///
/// async fn ping(_ctx: RequestContext) -> Result<&'static str, ApiError> {
///     Ok("pong")
/// }
///
/// # tokio_test::block_on(async {
/// let mut server = Server::default();
/// server.router().get("/ping", ping);
///
/// let request = Request::get("/ping").body(Bytes::new()).unwrap();
/// let response = server.handle(request).await;
/// assert_eq!(response.status(), StatusCode::OK);
/// # });
/// ```
pub struct Server {
    config: MortarConfig,
    registry: Arc<ErrorRegistry>,
    registrar: Registrar,
}

impl Server {
    /// Creates a server using an application-extended error registry.
    #[must_use]
    pub fn new(config: MortarConfig, registry: ErrorRegistry) -> Self {
        let mut server = Self {
            config,
            registry: Arc::new(registry),
            registrar: Registrar::new(),
        };

        let version = server.config.server.version.clone();
        if let Err(e) = server.router().try_get("/version", move |_ctx: RequestContext| {
            let info = VersionInfo {
                version: version.clone(),
            };
            async move { Ok::<_, ApiError>(info) }
        }) {
            tracing::error!("Failed to register /version: {}", e);
        }

        server
    }

    /// Creates a server with the default error registry.
    #[must_use]
    pub fn from_config(config: &MortarConfig) -> Self {
        Self::new(config.clone(), ErrorRegistry::new())
    }

    /// The root route group.
    pub fn router(&mut self) -> RouteGroup<'_> {
        RouteGroup::new(&mut self.registrar, Registrar::ROOT)
    }

    /// Creates a top-level group at `prefix` and hands it to `router`.
    ///
    /// # Panics
    ///
    /// Panics if `prefix` is not a valid path or `router` registers an
    /// invalid handler.
    pub fn group<R: GroupRouter>(&mut self, prefix: &str, router: R) -> &mut Self {
        self.router().group(prefix, router);
        self
    }

    /// Snapshot of the route tree.
    #[must_use]
    pub fn route_tree(&self) -> GroupNode {
        self.registrar.tree(Registrar::ROOT)
    }

    /// The error registry shared by every request.
    #[must_use]
    pub fn registry(&self) -> &ErrorRegistry {
        &self.registry
    }

    /// The configuration the server was built from.
    #[must_use]
    pub fn config(&self) -> &MortarConfig {
        &self.config
    }

    fn body_read_timeout(&self) -> Duration {
        Duration::from_millis(self.config.server.body_read_timeout_ms)
    }

    /// Dispatches one fully read request.
    ///
    /// A request matching no route gets a plain-text `404 page not found`.
    pub async fn handle(&self, request: Request<Bytes>) -> HttpResponse {
        let Some((route, params)) = self
            .registrar
            .table()
            .find(request.method(), request.uri().path())
        else {
            tracing::debug!("No route for {} {}", request.method(), request.uri().path());
            return plain(StatusCode::NOT_FOUND, "404 page not found");
        };

        let ctx = RequestContext::new(Exchange::from_request(request, params), Arc::clone(&route.info));
        invoke::run(ctx, &route.chain, &route.terminal, &self.registry).await
    }

    /// Serves on the configured address until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Serves on the configured address until `shutdown` is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr: SocketAddr = self.config.server.http_addr.parse().map_err(|e| {
            ServerError::Bind(format!("invalid address '{}': {}", self.config.server.http_addr, e))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        tracing::info!("Server listening on {}", listener.local_addr()?);
        let server = Arc::new(self);

        loop {
            tokio::select! {
                result = listener.accept() => match result {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, shutdown).await {
                                tracing::error!("Connection error from {}: {}", remote_addr, e);
                            }
                        });
                    }
                    Err(e) => tracing::error!("Failed to accept connection: {}", e),
                },
                () = shutdown.recv() => {
                    tracing::info!("Server stopped");
                    return Ok(());
                }
            }
        }
    }

    async fn handle_connection(self: Arc<Self>, stream: TcpStream, shutdown: ShutdownSignal) -> Result<(), hyper::Error> {
        let server = Arc::clone(&self);
        let service = service_fn(move |request: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_incoming(request).await) }
        });

        let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
        tokio::select! {
            result = conn => result,
            () = shutdown.recv() => Ok(()),
        }
    }

    async fn handle_incoming(&self, request: Request<Incoming>) -> HttpResponse {
        let (parts, body) = request.into_parts();
        match tokio::time::timeout(self.body_read_timeout(), body.collect()).await {
            Ok(Ok(collected)) => self.handle(Request::from_parts(parts, collected.to_bytes())).await,
            Ok(Err(e)) => {
                tracing::warn!("Failed to read request body: {}", e);
                plain(StatusCode::BAD_REQUEST, "failed to read request body")
            }
            Err(_) => {
                tracing::warn!("Request body read timed out for {} {}", parts.method, parts.uri.path());
                plain(StatusCode::REQUEST_TIMEOUT, "request body read timed out")
            }
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::from_config(&MortarConfig::default())
    }
}

//! Route grouping.
//!
//! Groups form a tree of path prefixes built once at startup. Each node owns
//! the routes and middleware registered on it; a route captures the
//! middleware of its group and every ancestor as registered so far.
//!
//! # Example
//!
//! ```rust
//! use mortar_core::{ApiError, RequestContext};
//! use mortar_server::{RouteGroup, Server};
//!
//! async fn list_items(_ctx: RequestContext) -> Result<Vec<u32>, ApiError> {
//!     Ok(vec![1, 2, 3])
//! }
//!
//! async fn audit(ctx: RequestContext) -> Result<(), ApiError> {
//!     ctx.set_field("audited", true);
//!     Ok(())
//! }
//!
//! let mut server = Server::default();
//! server.group("/api", |api: &mut RouteGroup<'_>| {
//!     api.middleware(audit);
//!     api.get("/items", list_items);
//! });
//!
//! let tree = server.route_tree();
//! assert_eq!(tree.children()[0].prefix(), "/api");
//! assert_eq!(tree.children()[0].routes()[0].path(), "/api/items");
//! ```

use http::Method;
use mortar_extract::ParamList;
use mortar_telemetry::ctx_info;

use crate::invoke::{self, MiddlewareStep};
use crate::path::{self, Template};
use crate::routes::RouteTable;
use crate::{validate, Handler, HandlerSpec, Middleware, RegistrationError};

struct NodeData {
    prefix: String,
    parent: Option<usize>,
    routes: Vec<HandlerSpec>,
    middleware: Vec<(HandlerSpec, MiddlewareStep)>,
    children: Vec<usize>,
}

impl NodeData {
    fn new(prefix: String, parent: Option<usize>) -> Self {
        Self {
            prefix,
            parent,
            routes: Vec::new(),
            middleware: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Arena of group nodes plus the flat route table they feed.
pub(crate) struct Registrar {
    nodes: Vec<NodeData>,
    table: RouteTable,
}

impl Registrar {
    pub(crate) const ROOT: usize = 0;

    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(String::new(), None)],
            table: RouteTable::default(),
        }
    }

    pub(crate) fn table(&self) -> &RouteTable {
        &self.table
    }

    fn add_child(&mut self, parent: usize, prefix: String) -> usize {
        let id = self.nodes.len();
        self.nodes.push(NodeData::new(prefix, Some(parent)));
        self.nodes[parent].children.push(id);
        id
    }

    /// Middleware of `node` and its ancestors, outermost first.
    fn chain(&self, node: usize) -> Vec<MiddlewareStep> {
        let mut lineage = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            lineage.push(id);
            current = self.nodes[id].parent;
        }

        lineage
            .iter()
            .rev()
            .flat_map(|&id| self.nodes[id].middleware.iter().map(|(_, step)| step.clone()))
            .collect()
    }

    pub(crate) fn tree(&self, node: usize) -> GroupNode {
        let data = &self.nodes[node];
        GroupNode {
            prefix: data.prefix.clone(),
            routes: data.routes.clone(),
            middleware: data.middleware.iter().map(|(spec, _)| spec.clone()).collect(),
            children: data.children.iter().map(|&child| self.tree(child)).collect(),
        }
    }
}

/// Read-only snapshot of one group and its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    prefix: String,
    routes: Vec<HandlerSpec>,
    middleware: Vec<HandlerSpec>,
    children: Vec<GroupNode>,
}

impl GroupNode {
    /// Accumulated prefix; empty for the root.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Terminal routes registered directly on this group.
    #[must_use]
    pub fn routes(&self) -> &[HandlerSpec] {
        &self.routes
    }

    /// Middleware registered directly on this group.
    #[must_use]
    pub fn middleware(&self) -> &[HandlerSpec] {
        &self.middleware
    }

    /// Child groups in registration order.
    #[must_use]
    pub fn children(&self) -> &[GroupNode] {
        &self.children
    }
}

/// Registers routes and middleware against a [`RouteGroup`].
///
/// Implemented for any `FnOnce(&mut RouteGroup<'_>)`.
pub trait GroupRouter {
    /// Adds this router's routes to `group`.
    fn register(self, group: &mut RouteGroup<'_>);
}

impl<F> GroupRouter for F
where
    F: FnOnce(&mut RouteGroup<'_>),
{
    fn register(self, group: &mut RouteGroup<'_>) {
        self(group);
    }
}

/// A handle for registering on one node of the route tree.
///
/// Every method has a `try_` twin returning [`RegistrationError`]; the plain
/// method panics with the same message, aborting startup.
pub struct RouteGroup<'a> {
    registrar: &'a mut Registrar,
    node: usize,
}

macro_rules! verbs {
    ($($name:ident, $try_name:ident => $method:ident;)*) => {
        $(
            #[doc = concat!("Registers a `", stringify!($method), "` handler.")]
            ///
            /// # Panics
            ///
            /// Panics if the handler or path is rejected.
            pub fn $name<H, Args>(&mut self, path: &str, handler: H) -> &mut Self
            where
                H: Handler<Args>,
                Args: ParamList,
            {
                self.route(Method::$method, path, handler)
            }

            #[doc = concat!("Registers a `", stringify!($method), "` handler.")]
            ///
            /// # Errors
            ///
            /// Returns the first [`RegistrationError`] found.
            pub fn $try_name<H, Args>(&mut self, path: &str, handler: H) -> Result<&mut Self, RegistrationError>
            where
                H: Handler<Args>,
                Args: ParamList,
            {
                self.try_route(Method::$method, path, handler)
            }
        )*
    };
}

impl<'a> RouteGroup<'a> {
    pub(crate) fn new(registrar: &'a mut Registrar, node: usize) -> Self {
        Self { registrar, node }
    }

    /// Accumulated prefix of this group.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.registrar.nodes[self.node].prefix
    }

    /// Creates a child group at `prefix` and hands it to `router`.
    ///
    /// Registering the same prefix twice yields two separate subtrees.
    ///
    /// # Panics
    ///
    /// Panics if the combined prefix is not a valid path.
    pub fn group<R: GroupRouter>(&mut self, prefix: &str, router: R) -> &mut Self {
        match self.try_group(prefix, router) {
            Ok(_) => self,
            Err(e) => panic!("{e}"),
        }
    }

    /// Creates a child group at `prefix` and hands it to `router`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidPath`] if the combined prefix is
    /// not a valid path.
    pub fn try_group<R: GroupRouter>(&mut self, prefix: &str, router: R) -> Result<&mut Self, RegistrationError> {
        let full = path::join(self.prefix(), prefix);
        Template::parse(&full)?;

        let child = self.registrar.add_child(self.node, full);
        router.register(&mut RouteGroup::new(self.registrar, child));
        Ok(self)
    }

    /// Registers a terminal handler for `method` and `path`.
    ///
    /// # Panics
    ///
    /// Panics if the handler or path is rejected.
    pub fn route<H, Args>(&mut self, method: Method, path: &str, handler: H) -> &mut Self
    where
        H: Handler<Args>,
        Args: ParamList,
    {
        match self.add_route(&method, path, handler) {
            Ok(()) => self,
            Err(e) => panic!("{e}"),
        }
    }

    /// Registers a terminal handler for `method` and `path`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistrationError`] found.
    pub fn try_route<H, Args>(&mut self, method: Method, path: &str, handler: H) -> Result<&mut Self, RegistrationError>
    where
        H: Handler<Args>,
        Args: ParamList,
    {
        self.add_route(&method, path, handler)?;
        Ok(self)
    }

    verbs! {
        get, try_get => GET;
        post, try_post => POST;
        put, try_put => PUT;
        patch, try_patch => PATCH;
        delete, try_delete => DELETE;
        head, try_head => HEAD;
    }

    /// Adds a middleware run ahead of every route registered afterwards on
    /// this group or its descendants.
    ///
    /// # Panics
    ///
    /// Panics if the middleware is rejected.
    pub fn middleware<M, Args>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware<Args>,
        Args: ParamList,
    {
        match self.try_middleware(middleware) {
            Ok(_) => self,
            Err(e) => panic!("{e}"),
        }
    }

    /// Adds a middleware run ahead of every route registered afterwards on
    /// this group or its descendants.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistrationError`] found.
    pub fn try_middleware<M, Args>(&mut self, middleware: M) -> Result<&mut Self, RegistrationError>
    where
        M: Middleware<Args>,
        Args: ParamList,
    {
        let spec = HandlerSpec::middleware(self.prefix(), std::any::type_name::<M>(), Args::describe());
        validate(&spec)?;

        ctx_info!(&*spec.route_info(), "Registered: {} {}", spec.method(), spec.path());
        self.registrar.nodes[self.node]
            .middleware
            .push((spec, invoke::middleware(middleware)));
        Ok(self)
    }

    fn add_route<H, Args>(&mut self, method: &Method, path: &str, handler: H) -> Result<(), RegistrationError>
    where
        H: Handler<Args>,
        Args: ParamList,
    {
        let full = path::join(self.prefix(), path);
        let spec = HandlerSpec::terminal(method, full, std::any::type_name::<H>(), Args::describe());
        validate(&spec)?;

        let chain = self.registrar.chain(self.node);
        self.registrar
            .table
            .insert(&spec, chain, invoke::terminal(handler))?;

        ctx_info!(&*spec.route_info(), "Registered: {} {}", spec.method(), spec.path());
        self.registrar.nodes[self.node].routes.push(spec);
        Ok(())
    }
}

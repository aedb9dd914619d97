//! The route table consulted on every request.

use std::sync::Arc;

use http::Method;
use mortar_core::{PathParams, RouteInfo};

use crate::invoke::{MiddlewareStep, TerminalStep};
use crate::path::Template;
use crate::{HandlerSpec, RegistrationError};

/// One dispatchable route.
pub(crate) struct Route {
    pub(crate) method: Method,
    pub(crate) template: Template,
    pub(crate) info: Arc<RouteInfo>,
    pub(crate) chain: Vec<MiddlewareStep>,
    pub(crate) terminal: TerminalStep,
}

/// Write-once table of routes; read-only once the server runs.
#[derive(Default)]
pub(crate) struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Adds a route, rejecting a `(method, path)` that is already taken.
    pub(crate) fn insert(
        &mut self,
        spec: &HandlerSpec,
        chain: Vec<MiddlewareStep>,
        terminal: TerminalStep,
    ) -> Result<(), RegistrationError> {
        let template = Template::parse(spec.path())?;
        let method = Method::from_bytes(spec.method().as_bytes()).map_err(|e| {
            RegistrationError::InvalidPath {
                path: spec.path().to_string(),
                reason: format!("invalid method '{}': {e}", spec.method()),
            }
        })?;

        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.template.overlaps(&template))
        {
            return Err(RegistrationError::DuplicateRoute {
                method: spec.method().to_string(),
                path: spec.path().to_string(),
            });
        }

        self.routes.push(Route {
            method,
            template,
            info: spec.route_info(),
            chain,
            terminal,
        });
        Ok(())
    }

    /// Finds the route for a request.
    ///
    /// The match with the most literal segments wins; ties go to the route
    /// registered first.
    pub(crate) fn find(&self, method: &Method, path: &str) -> Option<(&Route, PathParams)> {
        let mut best: Option<(&Route, PathParams)> = None;
        for route in self.routes.iter().filter(|r| r.method == method) {
            if let Some(params) = route.template.matches(path) {
                let better = best
                    .as_ref()
                    .map_or(true, |(b, _)| route.template.literal_count() > b.template.literal_count());
                if better {
                    best = Some((route, params));
                }
            }
        }
        best
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::BoxFuture;
    use crate::respond::HttpResponse;
    use mortar_core::{ErrorRegistry, RequestContext};

    fn step() -> TerminalStep {
        Arc::new(|_ctx: RequestContext, registry: Arc<ErrorRegistry>| -> BoxFuture<HttpResponse> {
            Box::pin(async move { crate::respond::error_response(&registry.unknown()) })
        })
    }

    fn spec(method: &Method, path: &str, name: &'static str) -> HandlerSpec {
        HandlerSpec::terminal(method, path, name, Vec::new())
    }

    #[test]
    fn test_insert_and_find() {
        let mut table = RouteTable::default();
        table.insert(&spec(&Method::GET, "/items/{id}", "get_item"), Vec::new(), step()).unwrap();

        let (route, params) = table.find(&Method::GET, "/items/7").unwrap();
        assert_eq!(route.info.handler(), "get_item");
        assert_eq!(params.get("id"), Some("7"));

        assert!(table.find(&Method::POST, "/items/7").is_none());
        assert!(table.find(&Method::GET, "/items").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut table = RouteTable::default();
        table.insert(&spec(&Method::GET, "/items/{id}", "a"), Vec::new(), step()).unwrap();

        let err = table
            .insert(&spec(&Method::GET, "/items/:item", "b"), Vec::new(), step())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateRoute { .. }));

        table.insert(&spec(&Method::PUT, "/items/{id}", "c"), Vec::new(), step()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_literal_beats_variable() {
        let mut table = RouteTable::default();
        table.insert(&spec(&Method::GET, "/items/{id}", "get_item"), Vec::new(), step()).unwrap();
        table.insert(&spec(&Method::GET, "/items/new", "new_item"), Vec::new(), step()).unwrap();

        let (route, params) = table.find(&Method::GET, "/items/new").unwrap();
        assert_eq!(route.info.handler(), "new_item");
        assert!(params.is_empty());
    }
}

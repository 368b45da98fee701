//! # Route Manager
//!
//! Buffer between route groups declaring their handlers and those handlers
//! being bound onto a [`Server`].
//!
//! Route groups only see `&mut RouteManager`; they never touch the server. At
//! startup the manager snapshots its table into the [`Registry`]
//! ([`RouteManager::populate_self`]) and then flushes every buffered route onto the
//! server ([`RouteManager::register_to_server_instance`]).
//!
//! A route is keyed by method and path. Adding the same pair again replaces the
//! handler in place, so the first declaration keeps its position in the table.

use std::fmt;
use std::sync::Arc;

use http::Method;
use tracing::{debug, info, warn};

use crate::dispatcher::{HandlerRequest, HandlerResponse, RouteHandler};
use crate::registry::{keys, Registry};
use crate::server::{RegistrationError, Server};

/// A buffered route.
#[derive(Clone)]
pub struct RouteDescriptor {
    pub method: Method,
    pub path: String,
    pub handler: RouteHandler,
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Snapshot of the buffered `(method, path)` pairs, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable(Vec<(Method, String)>);

impl RouteTable {
    #[must_use]
    pub fn entries(&self) -> &[(Method, String)] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.0.iter().any(|(m, p)| m == method && p == path)
    }
}

impl fmt::Display for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (method, path) in &self.0 {
            writeln!(f, "{method:<6} {path}")?;
        }
        Ok(())
    }
}

/// Where the manager is in the startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// Collecting routes; nothing published yet
    Empty,
    /// Table snapshot stored in the registry
    Populated,
    /// Every buffered route bound onto a server
    Flushed,
}

#[derive(Debug)]
pub struct RouteManager {
    routes: Vec<RouteDescriptor>,
    state: RouteState,
}

impl Default for RouteManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            state: RouteState::Empty,
        }
    }

    #[must_use]
    pub fn state(&self) -> RouteState {
        self.state
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Buffer `handler` for `method` + `path`, replacing any handler already buffered there.
    pub fn add_route<F>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(&HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        let handler: RouteHandler = Arc::new(handler);
        match self
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            Some(existing) => {
                debug!(method = %method, path = %path, "Route redeclared - handler replaced");
                existing.handler = handler;
            }
            None => {
                debug!(method = %method, path = %path, "Route declared");
                self.routes.push(RouteDescriptor {
                    method: method.clone(),
                    path: path.to_string(),
                    handler,
                });
            }
        }

        if self.state == RouteState::Flushed {
            warn!(
                method = %method,
                path = %path,
                "Route added after flush - call register_to_server_instance again to bind it"
            );
        }
    }

    #[must_use]
    pub fn table(&self) -> RouteTable {
        RouteTable(
            self.routes
                .iter()
                .map(|r| (r.method.clone(), r.path.clone()))
                .collect(),
        )
    }

    /// Store the current route table in `registry` under [`keys::ROUTES`].
    ///
    /// Calling it again overwrites the earlier snapshot.
    pub fn populate_self(&mut self, registry: &mut Registry) {
        registry.set(keys::ROUTES, self.table());
        if self.state == RouteState::Empty {
            self.state = RouteState::Populated;
        }
    }

    /// Bind every buffered route onto `server`, in declaration order.
    ///
    /// The buffer is kept, so a later call binds the same routes again.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first [`RegistrationError`].
    pub fn register_to_server_instance(
        &mut self,
        server: &mut Server,
    ) -> Result<(), RegistrationError> {
        for route in &self.routes {
            info!(method = %route.method, path = %route.path, "Binding route");
            server.register(&route.method, &route.path, Arc::clone(&route.handler))?;
        }
        self.state = RouteState::Flushed;
        info!(routes_count = self.routes.len(), "Routes flushed to server");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(code: u16) -> impl Fn(&HandlerRequest) -> HandlerResponse + Send + Sync + 'static {
        move |_req| HandlerResponse::json(code, json!({ "status": code }))
    }

    #[test]
    fn redeclared_route_is_replaced_in_place() {
        let mut manager = RouteManager::new();
        manager.add_route(Method::GET, "/a", status(200));
        manager.add_route(Method::POST, "/a", status(200));
        manager.add_route(Method::GET, "/a", status(201));

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.routes()[0].method, Method::GET);
        assert_eq!(manager.routes()[1].method, Method::POST);
    }

    #[test]
    fn populate_self_is_idempotent_and_last_call_wins() {
        let mut registry = Registry::new();
        let mut manager = RouteManager::new();
        assert_eq!(manager.state(), RouteState::Empty);

        manager.add_route(Method::GET, "/heartbeat", status(200));
        manager.populate_self(&mut registry);
        manager.populate_self(&mut registry);
        assert_eq!(manager.state(), RouteState::Populated);
        assert_eq!(registry.get(keys::ROUTES).map(|t| t.len()), Some(1));

        manager.add_route(Method::POST, "/api/meta/:scope/:pkg", status(200));
        manager.populate_self(&mut registry);
        let table = registry.get(keys::ROUTES).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains(&Method::POST, "/api/meta/:scope/:pkg"));
    }

    #[test]
    fn flush_binds_every_route() {
        let mut manager = RouteManager::new();
        manager.add_route(Method::GET, "/heartbeat", status(200));
        manager.add_route(Method::POST, "/api/meta/:scope/:pkg", status(200));

        let mut server = Server::new("127.0.0.1:0");
        manager.register_to_server_instance(&mut server).unwrap();
        assert_eq!(manager.state(), RouteState::Flushed);

        let bound: Vec<String> = server
            .routes()
            .iter()
            .map(|r| r.handler_name.clone())
            .collect();
        assert_eq!(bound, vec!["GET /heartbeat", "POST /api/meta/:scope/:pkg"]);
    }

    #[test]
    fn flush_surfaces_unsupported_method() {
        let mut manager = RouteManager::new();
        manager.add_route(Method::DELETE, "/api/meta/:scope/:pkg", status(200));

        let mut server = Server::new("127.0.0.1:0");
        let err = manager.register_to_server_instance(&mut server).unwrap_err();
        assert!(matches!(err, RegistrationError::UnsupportedMethod { .. }));
        assert_ne!(manager.state(), RouteState::Flushed);
        assert!(server.routes().is_empty());
    }

    #[test]
    fn table_display_lists_routes() {
        let mut manager = RouteManager::new();
        manager.add_route(Method::GET, "/heartbeat", status(200));
        assert_eq!(manager.table().to_string(), "GET    /heartbeat\n");
    }
}

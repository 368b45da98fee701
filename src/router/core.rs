//! Router core module - hot path for request routing.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::radix::RadixRouter;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the static route tree.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Metadata for one bound route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    /// Declared pattern, e.g. `/api/meta/:scope/:pkg`
    pub path_pattern: Arc<str>,
    /// Dispatcher key, `"<METHOD> <pattern>"`
    pub handler_name: String,
}

impl RouteMeta {
    #[must_use]
    pub fn new(method: Method, path_pattern: &str) -> Self {
        let handler_name = format!("{method} {path_pattern}");
        Self {
            method,
            path_pattern: Arc::from(path_pattern),
            handler_name,
        }
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteMeta>,
    /// Path parameters extracted from the URL (e.g., `:scope` → `("scope", "acme")`)
    pub path_params: ParamVec,
    pub handler_name: String,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics when a name repeats at different depths.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to HashMap for compatibility
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Router that matches HTTP requests to bound routes using a radix tree.
///
/// Routes are bound one at a time (see [`crate::server::Server::register`]);
/// binding the same method and pattern twice replaces the earlier route.
#[derive(Clone, Default)]
pub struct Router {
    radix_router: RadixRouter,
    /// Bound routes in binding order, for diagnostics
    routes: Vec<Arc<RouteMeta>>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a route. Returns `true` if it replaced an existing binding.
    pub fn insert(&mut self, route: RouteMeta) -> bool {
        let route = Arc::new(route);
        let replaced = self.radix_router.insert(Arc::clone(&route)).is_some();
        if replaced {
            self.routes
                .retain(|r| !(r.method == route.method && r.path_pattern == route.path_pattern));
            warn!(
                method = %route.method,
                route_pattern = %route.path_pattern,
                "Route rebound - previous binding replaced"
            );
        }
        debug!(
            method = %route.method,
            route_pattern = %route.path_pattern,
            routes_count = self.routes.len() + 1,
            "Route bound"
        );
        self.routes.push(route);
        replaced
    }

    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteMeta>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Match an HTTP request to a route.
    ///
    /// Returns `None` when nothing matches (the server answers 404).
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let match_start = std::time::Instant::now();
        let result = self.radix_router.route(method, path);
        let match_duration = match_start.elapsed();

        if let Some((route, params)) = result {
            let handler_name = route.handler_name.clone();
            debug!(
                method = %method,
                path = %path,
                route_pattern = %route.path_pattern,
                path_params = ?params,
                duration_us = match_duration.as_micros(),
                "Route matched"
            );
            return Some(RouteMatch {
                route,
                path_params: params,
                handler_name,
            });
        }

        debug!(
            method = %method,
            path = %path,
            duration_us = match_duration.as_micros(),
            "No route matched"
        );
        None
    }
}

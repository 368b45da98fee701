//! Radix tree implementation for HTTP route matching
//!
//! Paths are split into segments and stored in a tree where:
//! - Each node represents a path segment
//! - Static segments (e.g., `heartbeat`) match exactly
//! - Parameter segments (`:scope` or `{scope}`) match any single segment
//! - Routes are stored at terminal nodes, keyed by HTTP method
//!
//! Static children are always tried before parameter children, so
//! `/api/meta/latest` wins over `/api/meta/:scope` for that exact path.
//!
//! Captured parameter values are percent-decoded (`%40acme` → `@acme`); `+` is
//! left as-is since it only means a space in form bodies and query strings.

use http::Method;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use super::core::{ParamVec, RouteMeta};

/// Return the parameter name when `segment` is a `:name` or `{name}` placeholder.
pub(crate) fn param_name(segment: &str) -> Option<&str> {
    if let Some(name) = segment.strip_prefix(':') {
        return (!name.is_empty()).then_some(name);
    }
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

/// Percent-decode a captured segment. Invalid UTF-8 is replaced, not rejected.
fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    path.trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Clone)]
struct RadixNode {
    /// The path segment this node represents (without leading /)
    segment: Cow<'static, str>,
    /// Route metadata per HTTP method when this node terminates a route
    routes: HashMap<Method, Arc<RouteMeta>>,
    /// Parameter name if this segment is a path parameter
    param_name: Option<Cow<'static, str>>,
    children: Vec<RadixNode>,
    /// Parameter children; different names at the same position get separate nodes
    /// (e.g. `/users/:id/posts` vs `/users/:user_id/comments`)
    param_children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(segment: Cow<'static, str>) -> Self {
        Self {
            segment,
            routes: HashMap::new(),
            param_name: None,
            children: Vec::new(),
            param_children: Vec::new(),
        }
    }

    fn new_param(param_name: Cow<'static, str>) -> Self {
        Self {
            segment: Cow::Borrowed(""),
            routes: HashMap::new(),
            param_name: Some(param_name),
            children: Vec::new(),
            param_children: Vec::new(),
        }
    }

    /// Insert a route, replacing any route already stored for the same method at this node.
    fn insert(
        &mut self,
        segments: &[&str],
        method: Method,
        route: Arc<RouteMeta>,
    ) -> Option<Arc<RouteMeta>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.insert(method, route);
        };

        if let Some(name) = param_name(segment) {
            if let Some(child) = self
                .param_children
                .iter_mut()
                .find(|c| c.param_name.as_deref() == Some(name))
            {
                return child.insert(remaining, method, route);
            }

            let mut child = RadixNode::new_param(Cow::Owned(name.to_string()));
            let replaced = child.insert(remaining, method, route);
            self.param_children.push(child);
            return replaced;
        }

        if let Some(child) = self.children.iter_mut().find(|c| c.segment == *segment) {
            return child.insert(remaining, method, route);
        }

        let mut child = RadixNode::new(Cow::Owned(segment.to_string()));
        let replaced = child.insert(remaining, method, route);
        self.children.push(child);
        replaced
    }

    fn search(
        &self,
        segments: &[&str],
        method: &Method,
        params: &mut ParamVec,
    ) -> Option<Arc<RouteMeta>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.get(method).cloned();
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(route) = child.search(remaining, method, params) {
                    return Some(route);
                }
            }
        }

        for param_child in &self.param_children {
            if let Some(ref name) = param_child.param_name {
                params.push((Arc::from(name.as_ref()), decode_segment(segment)));
                if let Some(route) = param_child.search(remaining, method, params) {
                    return Some(route);
                }
                // Backtrack
                params.pop();
            }
        }

        None
    }
}

/// Radix tree-based route table.
///
/// Lookup is O(k) in the number of path segments rather than the number of routes.
#[derive(Clone)]
pub struct RadixRouter {
    root: RadixNode,
}

impl Default for RadixRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl RadixRouter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: RadixNode::new(Cow::Borrowed("")),
        }
    }

    /// Insert a route, returning the route it replaced (same method and pattern), if any.
    pub fn insert(&mut self, route: Arc<RouteMeta>) -> Option<Arc<RouteMeta>> {
        let pattern = Arc::clone(&route.path_pattern);
        let segments = split_segments(&pattern);
        let method = route.method.clone();
        self.root.insert(&segments, method, route)
    }

    /// Match a request path, returning the route and extracted path parameters.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<(Arc<RouteMeta>, ParamVec)> {
        let segments = split_segments(path);
        let mut params = ParamVec::new();
        let route = self.root.search(&segments, method, &mut params)?;
        Some((route, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(method: Method, path: &str) -> Arc<RouteMeta> {
        Arc::new(RouteMeta::new(method, path))
    }

    fn get<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
        params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_param_name_syntaxes() {
        assert_eq!(param_name(":scope"), Some("scope"));
        assert_eq!(param_name("{scope}"), Some("scope"));
        assert_eq!(param_name("scope"), None);
        assert_eq!(param_name(":"), None);
        assert_eq!(param_name("{}"), None);
    }

    #[test]
    fn test_radix_router_simple_route() {
        let mut router = RadixRouter::new();
        router.insert(meta(Method::GET, "/heartbeat"));

        let (route, params) = router.route(&Method::GET, "/heartbeat").unwrap();
        assert_eq!(route.handler_name, "GET /heartbeat");
        assert!(params.is_empty());
    }

    #[test]
    fn test_radix_router_colon_parameters() {
        let mut router = RadixRouter::new();
        router.insert(meta(Method::GET, "/api/meta/:scope/:pkg"));

        let (route, params) = router.route(&Method::GET, "/api/meta/acme/widget").unwrap();
        assert_eq!(&*route.path_pattern, "/api/meta/:scope/:pkg");
        assert_eq!(get(&params, "scope"), Some("acme"));
        assert_eq!(get(&params, "pkg"), Some("widget"));
    }

    #[test]
    fn test_captured_params_are_percent_decoded() {
        let mut router = RadixRouter::new();
        router.insert(meta(Method::GET, "/api/meta/:scope/:pkg"));

        let (_, params) = router
            .route(&Method::GET, "/api/meta/%40acme/my%20widget")
            .unwrap();
        assert_eq!(get(&params, "scope"), Some("@acme"));
        assert_eq!(get(&params, "pkg"), Some("my widget"));

        let (_, params) = router.route(&Method::GET, "/api/meta/a+b/c%2Fd").unwrap();
        assert_eq!(get(&params, "scope"), Some("a+b"));
        assert_eq!(get(&params, "pkg"), Some("c/d"));
    }

    #[test]
    fn test_radix_router_method_filtering() {
        let mut router = RadixRouter::new();
        router.insert(meta(Method::GET, "/items"));
        router.insert(meta(Method::POST, "/items"));

        assert_eq!(
            router.route(&Method::GET, "/items").unwrap().0.handler_name,
            "GET /items"
        );
        assert_eq!(
            router.route(&Method::POST, "/items").unwrap().0.handler_name,
            "POST /items"
        );
        assert!(router.route(&Method::PUT, "/items").is_none());
    }

    #[test]
    fn test_radix_router_no_match() {
        let mut router = RadixRouter::new();
        router.insert(meta(Method::GET, "/users/:id"));

        assert!(router.route(&Method::GET, "/posts/123").is_none());
        assert!(router.route(&Method::GET, "/users").is_none());
        assert!(router.route(&Method::GET, "/users/1/extra").is_none());
    }

    #[test]
    fn test_static_segment_preferred_over_param() {
        let mut router = RadixRouter::new();
        router.insert(meta(Method::GET, "/pkgs/:name"));
        router.insert(meta(Method::GET, "/pkgs/latest"));

        let (route, params) = router.route(&Method::GET, "/pkgs/latest").unwrap();
        assert_eq!(&*route.path_pattern, "/pkgs/latest");
        assert!(params.is_empty());
        let (route, _) = router.route(&Method::GET, "/pkgs/other").unwrap();
        assert_eq!(&*route.path_pattern, "/pkgs/:name");
    }

    #[test]
    fn test_insert_same_method_and_path_replaces() {
        let mut router = RadixRouter::new();
        assert!(router.insert(meta(Method::GET, "/a")).is_none());
        assert!(router.insert(meta(Method::GET, "/a")).is_some());
        assert!(router.insert(meta(Method::POST, "/a")).is_none());
    }

    #[test]
    fn test_radix_router_different_param_names_same_position() {
        let mut router = RadixRouter::new();
        router.insert(meta(Method::GET, "/users/:user_id/posts"));
        router.insert(meta(Method::GET, "/users/{id}/comments"));

        let (_, params1) = router.route(&Method::GET, "/users/123/posts").unwrap();
        assert_eq!(get(&params1, "user_id"), Some("123"));
        assert!(get(&params1, "id").is_none());

        let (_, params2) = router.route(&Method::GET, "/users/456/comments").unwrap();
        assert_eq!(get(&params2, "id"), Some("456"));
        assert!(get(&params2, "user_id").is_none());
    }
}

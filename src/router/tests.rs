use super::{RouteMeta, Router};
use http::Method;

fn meta_router() -> Router {
    let mut router = Router::new();
    router.insert(RouteMeta::new(Method::GET, "/heartbeat"));
    router.insert(RouteMeta::new(Method::GET, "/api/meta/:scope/:pkg"));
    router.insert(RouteMeta::new(Method::POST, "/api/meta/:scope/:pkg"));
    router
}

#[test]
fn test_route_keeps_binding_order() {
    let router = meta_router();
    let bound: Vec<String> = router
        .routes()
        .iter()
        .map(|r| r.handler_name.clone())
        .collect();
    assert_eq!(
        bound,
        vec![
            "GET /heartbeat",
            "GET /api/meta/:scope/:pkg",
            "POST /api/meta/:scope/:pkg"
        ]
    );
}

#[test]
fn test_route_extracts_params() {
    let router = meta_router();
    let m = router
        .route(&Method::POST, "/api/meta/acme/widget")
        .unwrap();
    assert_eq!(m.handler_name, "POST /api/meta/:scope/:pkg");
    assert_eq!(m.get_path_param("scope"), Some("acme"));
    assert_eq!(m.get_path_param("pkg"), Some("widget"));
    assert_eq!(m.path_params_map().len(), 2);
}

#[test]
fn test_unbound_method_or_path_is_none() {
    let router = meta_router();
    assert!(router.route(&Method::POST, "/heartbeat").is_none());
    assert!(router.route(&Method::GET, "/api/meta/acme").is_none());
    assert!(router.route(&Method::GET, "/").is_none());
}

#[test]
fn test_rebinding_replaces_without_duplicating() {
    let mut router = meta_router();
    assert!(router.insert(RouteMeta::new(Method::GET, "/heartbeat")));
    assert_eq!(router.len(), 3);
    assert_eq!(
        router.routes().last().map(|r| r.handler_name.as_str()),
        Some("GET /heartbeat")
    );
}

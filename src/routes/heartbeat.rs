use http::Method;
use serde_json::json;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::route_manager::RouteManager;

pub const HEARTBEAT_PATH: &str = "/heartbeat";

/// Liveness check: always `200 {"status":200}`.
#[must_use]
pub fn heartbeat(_req: &HandlerRequest) -> HandlerResponse {
    HandlerResponse::json(200, json!({ "status": 200 }))
}

pub fn register(manager: &mut RouteManager) {
    manager.add_route(Method::GET, HEARTBEAT_PATH, heartbeat);
}

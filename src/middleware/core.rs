use std::time::Duration;

use crate::dispatcher::HandlerResponse;
use crate::server::ParsedRequest;

/// Hook run by the server around every request, matched or not.
///
/// `before` may short-circuit the request by returning a response. `after` observes
/// the final response and the time spent producing it; it cannot change it.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &ParsedRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &ParsedRequest, _res: &HandlerResponse, _latency: Duration) {}
}

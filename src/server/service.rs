use super::request::{parse_request, ParsedRequest};
use super::response::write_handler_response;
use crate::dispatcher::{DispatchInput, Dispatcher, HandlerResponse};
use crate::middleware::Middleware;
use crate::router::Router;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// The `may_minihttp` service: middleware chain, routing and dispatch.
///
/// All state is shared read-only between connection coroutines.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    pub middlewares: Arc<Vec<Arc<dyn Middleware>>>,
}

impl AppService {
    #[must_use]
    pub fn new(
        router: Arc<Router>,
        dispatcher: Arc<Dispatcher>,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        Self {
            router,
            dispatcher,
            middlewares: Arc::new(middlewares),
        }
    }

    /// Produce the response for `req` and run every middleware's `after` hook on it.
    pub fn handle(&self, req: &mut ParsedRequest) -> HandlerResponse {
        let start = Instant::now();
        let response = self.respond(req);
        let latency = start.elapsed();
        for mw in self.middlewares.iter() {
            mw.after(req, &response, latency);
        }
        response
    }

    fn respond(&self, req: &mut ParsedRequest) -> HandlerResponse {
        for mw in self.middlewares.iter() {
            if let Some(response) = mw.before(req) {
                return response;
            }
        }

        let route_match = Method::from_bytes(req.method.as_bytes())
            .ok()
            .and_then(|method| self.router.route(&method, &req.path));
        let Some(route_match) = route_match else {
            return not_found(req);
        };

        req.route_pattern = Some(Arc::clone(&route_match.route.path_pattern));
        let input = DispatchInput {
            request_id: req.request_id,
            path: req.path.clone(),
            body: req.body.clone(),
        };

        match self.dispatcher.dispatch(route_match, input) {
            Some(response) => response,
            None => {
                warn!(
                    request_id = %req.request_id,
                    method = %req.method,
                    path = %req.path,
                    "Handler failed or not registered"
                );
                HandlerResponse::json(
                    500,
                    json!({
                        "error": "Handler failed or not registered",
                        "method": req.method,
                        "path": req.path
                    }),
                )
            }
        }
    }
}

fn not_found(req: &ParsedRequest) -> HandlerResponse {
    HandlerResponse::json(
        404,
        json!({ "error": "Not Found", "method": req.method, "path": req.path }),
    )
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let mut parsed = parse_request(req);
        let response = self.handle(&mut parsed);
        write_handler_response(res, &response);
        Ok(())
    }
}

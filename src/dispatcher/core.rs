//! Dispatcher core module - hot path for request dispatch.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use crate::ids::RequestId;
use crate::router::{ParamVec, RouteMatch};
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data passed to a handler coroutine
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub request_id: RequestId,
    pub method: Method,
    /// Concrete request path (without query string)
    pub path: String,
    /// Pattern of the bound route that matched
    pub route_pattern: Arc<str>,
    pub handler_name: String,
    pub path_params: ParamVec,
    /// Request body parsed as JSON (if present and valid)
    pub body: Option<Value>,
    /// Channel for sending the response back to the dispatcher
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

impl HandlerRequest {
    /// Get a path parameter by name ("last write wins" on duplicates)
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced by a handler
///
/// The content type follows from the body when written (see
/// [`crate::server::response::write_handler_response`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// A route handler: pure request → response function run inside a handler coroutine.
pub type RouteHandler = Arc<dyn Fn(&HandlerRequest) -> HandlerResponse + Send + Sync>;

/// Type alias for a channel sender that dispatches requests to a handler
pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Request-level inputs the dispatcher forwards to the handler.
#[derive(Debug, Clone, Default)]
pub struct DispatchInput {
    pub request_id: RequestId,
    pub path: String,
    pub body: Option<Value>,
}

/// Dispatcher that routes requests to registered handler coroutines
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// Map of handler names to their channel senders
    pub handlers: HashMap<String, HandlerSender>,
    stack_size: Option<usize>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `stack_size` bytes for handler coroutines spawned from now on.
    #[must_use]
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Add a handler sender under `name`, replacing any previous sender.
    ///
    /// Dropping the old sender closes its channel, so the old handler coroutine exits.
    pub fn add_sender(&mut self, name: &str, sender: HandlerSender) {
        if self.handlers.insert(name.to_string(), sender).is_some() {
            warn!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Replaced existing handler - old coroutine will exit"
            );
        } else {
            info!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Handler registered successfully"
            );
        }
    }

    /// Spawn a coroutine serving `handler` and register it under `name`.
    ///
    /// Handler panics are caught and converted to 500 responses, so one failing
    /// handler cannot take down its coroutine.
    ///
    /// # Safety
    ///
    /// This calls `may::coroutine::Builder::spawn()`, which is unsafe in the `may`
    /// runtime. The caller must ensure the runtime is configured before spawning and
    /// that `handler` does not block on thread-local state owned by another coroutine.
    ///
    /// # Errors
    ///
    /// Returns an error if the coroutine cannot be spawned; nothing is registered then.
    pub unsafe fn register_handler(&mut self, name: &str, handler: RouteHandler) -> io::Result<()> {
        let (tx, rx) = mpsc::channel::<HandlerRequest>();
        let handler_name_for_logging = name.to_string();

        let mut builder = coroutine::Builder::new().name(name.to_string());
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        // SAFETY: guaranteed by this function's contract; the closure owns all it captures.
        let spawn_result = unsafe {
            builder.spawn(move || {
                debug!(handler_name = %handler_name_for_logging, "Handler coroutine start");

                for req in rx.iter() {
                    let reply_tx = req.reply_tx.clone();
                    let request_id = req.request_id;
                    let execution_start = Instant::now();

                    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        handler(&req)
                    }));

                    let response = match outcome {
                        Ok(response) => {
                            debug!(
                                request_id = %request_id,
                                handler_name = %req.handler_name,
                                execution_time_us = execution_start.elapsed().as_micros() as u64,
                                status = response.status,
                                "Handler execution complete"
                            );
                            response
                        }
                        Err(panic) => {
                            let panic_message = panic
                                .downcast_ref::<&str>()
                                .map(|s| (*s).to_string())
                                .or_else(|| panic.downcast_ref::<String>().cloned())
                                .unwrap_or_else(|| "unknown panic".to_string());
                            error!(
                                request_id = %request_id,
                                handler_name = %req.handler_name,
                                panic_message = %panic_message,
                                "Handler panicked - recovered"
                            );
                            HandlerResponse::json(
                                500,
                                serde_json::json!({ "status": 500, "message": "internal error" }),
                            )
                        }
                    };

                    if reply_tx.send(response).is_err() {
                        warn!(request_id = %request_id, "Reply channel closed before response");
                    }
                }
            })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %name,
                error = %e,
                "Failed to spawn handler coroutine - CRITICAL"
            );
            return Err(e);
        }

        self.add_sender(name, tx);
        Ok(())
    }

    /// Dispatch a matched request to its handler and wait for the response.
    ///
    /// Returns `None` if no handler is registered for the route or the handler
    /// coroutine is gone.
    #[must_use]
    pub fn dispatch(&self, route_match: RouteMatch, input: DispatchInput) -> Option<HandlerResponse> {
        let (reply_tx, reply_rx) = mpsc::channel();

        let Some(tx) = self.handlers.get(&route_match.handler_name) else {
            let available_handlers: Vec<&String> = self.handlers.keys().collect();
            error!(
                handler_name = %route_match.handler_name,
                available_handlers = ?available_handlers,
                "Handler not found - CRITICAL"
            );
            return None;
        };

        let request_id = input.request_id;
        let request = HandlerRequest {
            request_id,
            method: route_match.route.method.clone(),
            path: input.path,
            route_pattern: Arc::clone(&route_match.route.path_pattern),
            handler_name: route_match.handler_name,
            path_params: route_match.path_params,
            body: input.body,
            reply_tx,
        };

        debug!(
            request_id = %request_id,
            handler_name = %request.handler_name,
            method = %request.method,
            path = %request.path,
            "Request dispatched to handler"
        );

        let handler_name = request.handler_name.clone();
        if let Err(e) = tx.send(request) {
            error!(
                request_id = %request_id,
                handler_name = %handler_name,
                error = %e,
                "Failed to send request to handler"
            );
            return None;
        }

        match reply_rx.recv() {
            Ok(response) => Some(response),
            Err(e) => {
                error!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    error = %e,
                    "Handler channel closed - handler may have crashed"
                );
                None
            }
        }
    }
}

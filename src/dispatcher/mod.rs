//! # Dispatcher Module
//!
//! Coroutine-based handler dispatch.
//!
//! ## Overview
//!
//! Every bound route gets its own handler coroutine on the `may` runtime. The
//! dispatcher keeps a map from handler name (`"<METHOD> <pattern>"`) to the
//! coroutine's request channel:
//!
//! 1. The router matches an incoming request to a [`crate::router::RouteMatch`]
//! 2. The dispatcher looks up the handler channel by name
//! 3. A [`HandlerRequest`] is sent to the coroutine, carrying a reply channel
//! 4. The handler runs and its [`HandlerResponse`] is sent back
//!
//! ## Error Handling
//!
//! - A handler panic is caught inside its coroutine and answered with a 500, the
//!   coroutine keeps serving
//! - A missing handler or closed channel makes [`Dispatcher::dispatch`] return
//!   `None`, which the server turns into a 500
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pkgmeta::dispatcher::{Dispatcher, HandlerResponse, RouteHandler};
//!
//! let mut dispatcher = Dispatcher::new();
//! let handler: RouteHandler = Arc::new(|_req| {
//!     HandlerResponse::json(200, serde_json::json!({ "status": 200 }))
//! });
//! unsafe { dispatcher.register_handler("GET /heartbeat", handler)? };
//! ```

mod core;

pub use core::{
    DispatchInput, Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec,
    RouteHandler, MAX_INLINE_HEADERS,
};

//! # Server Module
//!
//! HTTP serving on `may_minihttp`.
//!
//! [`Server`] is the surface the rest of the service sees: bind routes with
//! [`Server::register`], add middleware with [`Server::use_middleware`], then
//! [`Server::run`] (blocking) or [`Server::start`] (background, returns a
//! [`ServerHandle`]).
//!
//! Per request, [`AppService`] parses the request, runs the middleware chain,
//! routes it, and dispatches it to the handler coroutine. Requests that match no
//! bound route get `404 {"error":"Not Found","method":..,"path":..}`.

mod core;
pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use core::{RegistrationError, Server};
pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, ParsedRequest};
pub use service::AppService;

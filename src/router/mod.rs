//! # Router Module
//!
//! Path matching and route resolution.
//!
//! The router is responsible for:
//! - Holding the table of bound `(method, pattern)` routes
//! - Matching incoming HTTP requests to bound routes
//! - Extracting path parameters from matched routes
//!
//! Patterns use `:name` segments (`/api/meta/:scope/:pkg`); `{name}` is accepted
//! as an alternative spelling.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use pkgmeta::router::{RouteMeta, Router};
//!
//! let mut router = Router::new();
//! router.insert(RouteMeta::new(Method::GET, "/api/meta/:scope/:pkg"));
//!
//! let m = router.route(&Method::GET, "/api/meta/acme/widget").unwrap();
//! assert_eq!(m.get_path_param("scope"), Some("acme"));
//! assert!(router.route(&Method::POST, "/api/meta/acme/widget").is_none());
//! ```

mod core;
mod radix;
#[cfg(test)]
mod tests;

pub use core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};

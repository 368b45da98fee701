//! # pkgmeta
//!
//! **pkgmeta** is the metadata API of a package registry: a heartbeat endpoint plus
//! fetch/publish endpoints for package ownership and version metadata, backed by
//! SQLite and served on the `may` coroutine runtime.
//!
//! ## Architecture
//!
//! - **[`registry`]** - Typed startup container for shared handles (config, store, route table)
//! - **[`route_manager`]** - Buffer that decouples declaring a route from binding it
//! - **[`server`]** - HTTP server on `may_minihttp`: route binding, middleware chain, serving loop
//! - **[`router`]** - Radix-tree path matching with `:param` segments
//! - **[`dispatcher`]** - One handler coroutine per route, with panic recovery
//! - **[`middleware`]** - Request observability (latency, client type, body diagnostics)
//! - **[`routes`]** - The heartbeat and package metadata handlers
//! - **[`store`]** - Package metadata persistence
//! - **[`config`]**, **[`logging`]**, **[`runtime_config`]** - Ambient setup
//! - **[`cli`]** - `serve` and `routes` subcommands
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as AppService<br/>(may_minihttp)
//!     participant Router as Router
//!     participant Dispatcher as Dispatcher
//!     participant Handler as Handler<br/>(Coroutine)
//!     participant Obs as ObservabilityMiddleware
//!
//!     Client->>Service: POST /api/meta/acme/widget
//!     Service->>Service: Parse request, assign request id
//!     Service->>Router: route(POST, path)
//!     alt No route
//!         Router-->>Service: None
//!         Service->>Service: 404 Not Found
//!     else Matched
//!         Router-->>Service: RouteMatch {scope, pkg}
//!         Service->>Dispatcher: dispatch
//!         Dispatcher->>Handler: HandlerRequest via channel
//!         Handler-->>Dispatcher: HandlerResponse (500 on panic)
//!         Dispatcher-->>Service: HandlerResponse
//!     end
//!     Service->>Obs: after(request, response, latency)
//!     Obs->>Obs: info on 200, error + body hint otherwise
//!     Service-->>Client: HTTP response
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use pkgmeta::app::App;
//! use pkgmeta::config::AppConfig;
//!
//! let app = App::bootstrap(AppConfig::load(None)?)?;
//! app.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Runtime Considerations
//!
//! Handlers run in `may` coroutines, not on tokio. Coroutine stack size is set with
//! `PKGMETA_STACK_SIZE` (see [`runtime_config`]).

pub mod app;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod registry;
pub mod route_manager;
pub mod router;
pub mod routes;
pub mod runtime_config;
pub mod server;
pub mod store;

pub use app::App;
pub use registry::{Registry, RegistryKey};
pub use route_manager::RouteManager;
pub use server::Server;

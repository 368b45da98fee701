use super::http_server::{HttpServer, ServerHandle};
use super::service::AppService;
use crate::dispatcher::{Dispatcher, RouteHandler};
use crate::middleware::Middleware;
use crate::router::{RouteMeta, Router};
use crate::runtime_config::RuntimeConfig;
use http::Method;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Failure to bind a route onto the server.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("unsupported method {method} for route {path}")]
    UnsupportedMethod { method: Method, path: String },

    #[error("failed to spawn handler coroutine for {handler_name}")]
    Spawn {
        handler_name: String,
        #[source]
        source: io::Error,
    },
}

/// HTTP server wrapper: route binding, middleware chain and the serving loop.
///
/// Routes and middleware are added through `&mut self` before serving starts;
/// [`Server::start`] and [`Server::run`] consume the server, freezing both.
pub struct Server {
    addr: String,
    runtime: RuntimeConfig,
    router: Router,
    dispatcher: Dispatcher,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Server {
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self::with_runtime(addr, RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_runtime(addr: impl Into<String>, runtime: RuntimeConfig) -> Self {
        Self {
            addr: addr.into(),
            runtime,
            router: Router::new(),
            dispatcher: Dispatcher::new().with_stack_size(runtime.stack_size),
            middlewares: Vec::new(),
        }
    }

    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteMeta>] {
        self.router.routes()
    }

    /// Bind `handler` to `method` + `path`. Only `GET` and `POST` are served.
    ///
    /// Binding the same method and path again replaces the earlier handler.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::UnsupportedMethod`] for any other method, and
    /// [`RegistrationError::Spawn`] if the handler coroutine cannot be started.
    pub fn register(
        &mut self,
        method: &Method,
        path: &str,
        handler: RouteHandler,
    ) -> Result<(), RegistrationError> {
        if *method != Method::GET && *method != Method::POST {
            error!(method = %method, path = %path, "Unsupported method - route not bound");
            return Err(RegistrationError::UnsupportedMethod {
                method: method.clone(),
                path: path.to_string(),
            });
        }

        let route = RouteMeta::new(method.clone(), path);
        let handler_name = route.handler_name.clone();

        // SAFETY: handler coroutines get an explicit stack size from `runtime`, and route
        // handlers only touch their request and `Arc`-shared state.
        unsafe { self.dispatcher.register_handler(&handler_name, handler) }.map_err(
            |source| RegistrationError::Spawn {
                handler_name: handler_name.clone(),
                source,
            },
        )?;
        self.router.insert(route);
        Ok(())
    }

    /// Append `middleware` to the chain. Middleware runs in insertion order.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Freeze routes and middleware into the HTTP service.
    #[must_use]
    pub fn into_service(self) -> AppService {
        AppService::new(
            Arc::new(self.router),
            Arc::new(self.dispatcher),
            self.middlewares,
        )
    }

    /// Start serving in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved or bound.
    pub fn start(self) -> io::Result<ServerHandle> {
        let runtime = self.runtime;
        runtime.apply();
        let addr = self.addr.clone();
        let routes_count = self.router.len();
        let handle = HttpServer(self.into_service()).start(addr.as_str())?;
        info!(
            addr = %handle.addr(),
            routes_count = routes_count,
            stack_size = runtime.stack_size,
            "Server listening"
        );
        Ok(handle)
    }

    /// Serve until the process terminates.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot start or its accept loop panics.
    pub fn run(self) -> io::Result<()> {
        let handle = self.start()?;
        handle
            .join()
            .map_err(|_| io::Error::other("server coroutine panicked"))
    }
}

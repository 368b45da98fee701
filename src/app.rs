//! # Application Bootstrap
//!
//! Wires the service together in startup order:
//!
//! 1. Store configuration and a fresh instance id in the [`Registry`]
//! 2. Create the [`Server`] and install the observability middleware
//! 3. Connect the metadata store (fatal on failure)
//! 4. Let every route group declare its routes on a [`RouteManager`]
//! 5. Snapshot the route table into the registry and flush it onto the server
//!
//! The result is an [`App`] ready to [`App::run`] or [`App::start`].

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::ids::InstanceId;
use crate::middleware::ObservabilityMiddleware;
use crate::registry::{keys, Registry};
use crate::route_manager::{RouteManager, RouteTable};
use crate::routes;
use crate::server::{Server, ServerHandle};
use crate::store::{MetaStore, SqliteStore};

/// A fully wired service that has not started serving yet.
pub struct App {
    pub registry: Arc<Registry>,
    pub server: Server,
}

impl App {
    /// Build the service from `config`.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be opened or a route cannot be bound.
    pub fn bootstrap(config: AppConfig) -> Result<Self> {
        let mut registry = Registry::new();
        let instance_id = InstanceId::generate();
        registry.set(keys::INSTANCE_ID, instance_id);
        registry.set(keys::CONFIG, config.clone());

        let mut server = Server::new(config.bind_addr());
        server.use_middleware(Arc::new(ObservabilityMiddleware::from_config(&config)));

        let store = SqliteStore::connect(&config.database)
            .with_context(|| format!("failed to open metadata store {}", config.database))?;
        registry.set(keys::STORE, Arc::new(store) as Arc<dyn MetaStore>);

        let mut manager = RouteManager::new();
        routes::register_all(&mut manager, &registry)?;
        manager.populate_self(&mut registry);
        manager
            .register_to_server_instance(&mut server)
            .context("failed to bind routes")?;

        info!(
            instance_id = %instance_id,
            api_version = %config.api_version,
            addr = %server.addr(),
            routes_count = manager.len(),
            "Service bootstrapped"
        );
        Ok(Self {
            registry: Arc::new(registry),
            server,
        })
    }

    #[must_use]
    pub fn route_table(&self) -> RouteTable {
        self.registry
            .get(keys::ROUTES)
            .map(|table| table.as_ref().clone())
            .unwrap_or_default()
    }

    /// Serve in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address cannot be bound.
    pub fn start(self) -> Result<ServerHandle> {
        let addr = self.server.addr().to_string();
        self.server
            .start()
            .with_context(|| format!("failed to bind {addr}"))
    }

    /// Serve until the process terminates.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address cannot be bound.
    pub fn run(self) -> Result<()> {
        let addr = self.server.addr().to_string();
        self.server
            .run()
            .with_context(|| format!("server on {addr} stopped"))
    }
}

//! # Configuration Module
//!
//! Typed service configuration. Values are resolved in this order, later sources
//! winning:
//!
//! 1. Built-in defaults ([`AppConfig::default`])
//! 2. An optional YAML file (`--config config.yaml`)
//! 3. Environment variables
//! 4. CLI flags (applied by [`crate::cli`])
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `PKGMETA_API_VERSION` | `api_version` | `v2` |
//! | `PKGMETA_HOST` | `host` | `0.0.0.0` |
//! | `PKGMETA_PORT` | `port` | `8080` |
//! | `PKGMETA_DATABASE` | `database` | `pkgmeta.db` |
//!
//! ## Example File
//!
//! ```yaml
//! port: 9000
//! database: /var/lib/pkgmeta/meta.db
//! request_body_schema:
//!   /api/meta/:scope/:pkg: [latest_version]
//! ```

use std::collections::HashMap;
use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Position of the client token in a space-separated User-Agent header.
pub const DEFAULT_CLIENT_TYPE_TOKEN: usize = 10;

/// Per-route list of expected top-level JSON body fields.
///
/// Consulted only for diagnostics after a request failed; never used to reject
/// a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestSchema(HashMap<String, Vec<String>>);

impl RequestSchema {
    /// The schema table the service ships with.
    #[must_use]
    pub fn seeded() -> Self {
        let mut schema = Self::default();
        schema.declare("/heartbeat", Vec::<String>::new());
        schema.declare("/api/meta/:scope/:pkg", ["latest_version"]);
        schema
    }

    /// Declare (or replace) the expected fields for `route`.
    pub fn declare<I, S>(&mut self, route: &str, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(route.to_string(), fields.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn fields_for(&self, route: &str) -> Option<&[String]> {
        self.0.get(route).map(Vec::as_slice)
    }
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_version: String,
    pub host: String,
    pub port: u16,
    /// SQLite database path, or `:memory:`
    pub database: String,
    pub request_body_schema: RequestSchema,
    pub client_type_token: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_version: "v2".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            database: "pkgmeta.db".to_string(),
            request_body_schema: RequestSchema::seeded(),
            client_type_token: DEFAULT_CLIENT_TYPE_TOKEN,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML for `AppConfig`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if `raw` is not valid YAML for `AppConfig`.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply `PKGMETA_*` environment overrides. Unparseable values are ignored with a warning.
    pub fn apply_env(&mut self) {
        if let Ok(v) = env::var("PKGMETA_API_VERSION") {
            self.api_version = v;
        }
        if let Ok(v) = env::var("PKGMETA_HOST") {
            self.host = v;
        }
        if let Ok(v) = env::var("PKGMETA_PORT") {
            match v.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!(value = %v, "Ignoring invalid PKGMETA_PORT"),
            }
        }
        if let Ok(v) = env::var("PKGMETA_DATABASE") {
            self.database = v;
        }
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

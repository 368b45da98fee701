//! # CLI Module
//!
//! Command-line front-end for the service.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! ```bash
//! pkgmeta serve --config pkgmeta.yaml --port 9000 --database /var/lib/pkgmeta/meta.db
//! ```
//!
//! ### `routes`
//!
//! Prints the route table the service would bind, without opening the database
//! or listening:
//!
//! ```bash
//! pkgmeta routes
//! ```
//!
//! Flags win over `PKGMETA_*` environment variables, which win over the config file.

mod commands;


pub use commands::{run_cli, Cli, Commands, ServiceArgs};

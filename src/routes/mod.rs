//! # Routes
//!
//! The service's route groups. Each group declares its handlers on the
//! [`RouteManager`]; nothing here binds to a server directly.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/heartbeat` | [`heartbeat::heartbeat`] |
//! | GET | `/api/meta/:scope/:pkg` | [`meta::fetch`] |
//! | POST | `/api/meta/:scope/:pkg` | [`meta::publish`] |

pub mod heartbeat;
pub mod meta;

use anyhow::{Context, Result};

use crate::registry::{keys, Registry};
use crate::route_manager::RouteManager;

/// Declare every route group on `manager`, taking shared handles from `registry`.
///
/// # Errors
///
/// Returns an error if the metadata store has not been put in the registry.
pub fn register_all(manager: &mut RouteManager, registry: &Registry) -> Result<()> {
    heartbeat::register(manager);

    let store = registry
        .get(keys::STORE)
        .context("metadata store missing from registry")?;
    meta::register(manager, &store);
    Ok(())
}

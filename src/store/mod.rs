//! # Store Module
//!
//! Persistence for package ownership and version metadata.
//!
//! A package (`owner`/`name`) has many versions. The HTTP handlers only see the
//! [`MetaStore`] trait; [`SqliteStore`] is the implementation the service runs on.

mod error;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;

use serde::{Deserialize, Serialize};

/// A published version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: String,
    pub version: String,
}

/// Read model for one package and all of its versions, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub id: String,
    pub owner: String,
    pub name: String,
    /// Most recently published version, if any
    pub latest_version: Option<String>,
    pub available_versions: Vec<VersionSummary>,
}

/// Identifiers written by [`MetaStore::create_package_with_version`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRelease {
    pub package_id: String,
    pub version_id: String,
}

/// Package metadata storage shared by all handler coroutines.
pub trait MetaStore: Send + Sync {
    /// First package registered as `owner`/`name`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if there is none.
    fn find_package(&self, owner: &str, name: &str) -> StoreResult<PackageRecord>;

    /// Record `version` for `owner`/`name`, creating the package if it does not exist.
    ///
    /// Both rows are written in one transaction.
    ///
    /// # Errors
    ///
    /// Any database failure; nothing is written in that case.
    fn create_package_with_version(
        &self,
        owner: &str,
        name: &str,
        version: &str,
    ) -> StoreResult<CreatedRelease>;
}

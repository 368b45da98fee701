//! Error types for the metadata store.

use thiserror::Error;

/// Metadata store error.
///
/// Handlers distinguish [`StoreError::NotFound`] from everything else; the other
/// variants exist for logs and startup diagnostics.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("package not found: {owner}/{name}")]
    NotFound { owner: String, name: String },

    #[error("database connection to {path} failed")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database query failed")]
    Query(#[from] rusqlite::Error),
}

impl StoreError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

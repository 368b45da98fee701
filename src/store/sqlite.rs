//! SQLite-backed [`MetaStore`].

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use super::{CreatedRelease, MetaStore, PackageRecord, StoreError, StoreResult, VersionSummary};

const IN_MEMORY: &str = ":memory:";

const BOOTSTRAP: &str = "
CREATE TABLE IF NOT EXISTS packages (
    id    TEXT PRIMARY KEY NOT NULL,
    owner TEXT NOT NULL,
    name  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS packages_owner_name ON packages (owner, name);
CREATE TABLE IF NOT EXISTS package_versions (
    id         TEXT PRIMARY KEY NOT NULL,
    version    TEXT NOT NULL,
    package_id TEXT NOT NULL REFERENCES packages (id)
);
CREATE INDEX IF NOT EXISTS package_versions_package ON package_versions (package_id);
";

/// Metadata store on a single SQLite connection.
///
/// The connection is guarded by a mutex, so handler coroutines take turns.
/// Insertion order (`rowid`) defines both "first package" and "latest version".
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure both tables exist.
    ///
    /// `":memory:"` opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the database cannot be opened or bootstrapped.
    pub fn connect(path: &str) -> StoreResult<Self> {
        let conn = if path == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .and_then(|conn| conn.execute_batch(BOOTSTRAP).map(|()| conn))
        .map_err(|source| StoreError::Connection {
            path: path.to_string(),
            source,
        })?;

        info!(database = %path, "Metadata store connected");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if SQLite cannot allocate the database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::connect(IN_MEMORY)
    }

    /// Number of package rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] on database failure.
    pub fn package_count(&self) -> StoreResult<usize> {
        self.count("SELECT COUNT(*) FROM packages")
    }

    /// Number of version rows across all packages.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] on database failure.
    pub fn version_count(&self) -> StoreResult<usize> {
        self.count("SELECT COUNT(*) FROM package_versions")
    }

    fn count(&self, sql: &str) -> StoreResult<usize> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or_default())
    }
}

impl MetaStore for SqliteStore {
    fn find_package(&self, owner: &str, name: &str) -> StoreResult<PackageRecord> {
        let conn = self.conn.lock();

        let package = conn
            .query_row(
                "SELECT id, owner, name FROM packages
                 WHERE owner = ?1 AND name = ?2 ORDER BY rowid LIMIT 1",
                params![owner, name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((id, owner, name)) = package else {
            return Err(StoreError::NotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        };

        let mut stmt = conn.prepare(
            "SELECT id, version FROM package_versions WHERE package_id = ?1 ORDER BY rowid",
        )?;
        let available_versions = stmt
            .query_map(params![id], |row| {
                Ok(VersionSummary {
                    id: row.get(0)?,
                    version: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let latest_version = available_versions.last().map(|v| v.version.clone());

        debug!(
            package_id = %id,
            versions = available_versions.len(),
            "Package metadata loaded"
        );
        Ok(PackageRecord {
            id,
            owner,
            name,
            latest_version,
            available_versions,
        })
    }

    fn create_package_with_version(
        &self,
        owner: &str,
        name: &str,
        version: &str,
    ) -> StoreResult<CreatedRelease> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM packages WHERE owner = ?1 AND name = ?2 ORDER BY rowid LIMIT 1",
                params![owner, name],
                |row| row.get(0),
            )
            .optional()?;
        let package_id = match existing {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                tx.execute(
                    "INSERT INTO packages (id, owner, name) VALUES (?1, ?2, ?3)",
                    params![id, owner, name],
                )?;
                id
            }
        };

        let version_id = Uuid::new_v4().to_string();
        tx.execute(
            "INSERT INTO package_versions (id, version, package_id) VALUES (?1, ?2, ?3)",
            params![version_id, version, package_id],
        )?;
        tx.commit()?;

        info!(
            package_id = %package_id,
            version_id = %version_id,
            owner = %owner,
            name = %name,
            version = %version,
            "Package version recorded"
        );
        Ok(CreatedRelease {
            package_id,
            version_id,
        })
    }
}

//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for the payments service. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use payments_core::{PaymentId, PaymentVersion};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{Store, VersionLog};

const SELECT_COLUMNS: &str = "SELECT external_id, version, organisation_id, attributes, deleted";

/// Connection settings applied when a database is opened.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    /// How long a statement waits on a lock held by another connection
    /// before failing with `SQLITE_BUSY`.
    pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5_000),
        }
    }
}

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. Each transaction runs on a blocking
/// thread with exclusive use of the connection, so no two repository
/// operations ever share a transaction.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file (and missing parent directories) and runs
    /// migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &SqliteOptions::default())
    }

    /// Open a SQLite database at the given path with explicit options.
    pub fn open_with(path: impl AsRef<Path>, options: &SqliteOptions) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening sqlite store");
        Self::from_connection(Connection::open(path)?, options)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, &SqliteOptions::default())
    }

    fn from_connection(mut conn: Connection, options: &SqliteOptions) -> Result<Self> {
        conn.busy_timeout(options.busy_timeout)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// The schema version of the open database.
    pub async fn schema_version(&self) -> Result<u32> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || migration::schema_version(&lock(&conn)))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

/// Lock the connection.
///
/// A poisoned mutex means a transaction body panicked. Its transaction was
/// rolled back while unwinding, so the connection is safe to reuse.
fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Store for SqliteStore {
    async fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut dyn VersionLog) -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();

        let joined = tokio::task::spawn_blocking(move || -> std::result::Result<T, E> {
            let mut conn = lock(&conn);
            let tx = conn.transaction().map_err(StoreError::from)?;

            let mut log = SqliteLog { conn: &tx };
            let outcome = f(&mut log as &mut dyn VersionLog);
            match outcome {
                Ok(value) => {
                    tx.commit().map_err(StoreError::from)?;
                    Ok(value)
                }
                Err(e) => {
                    if let Err(rollback) = tx.rollback() {
                        warn!(error = %rollback, "rollback failed");
                    }
                    Err(e)
                }
            }
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(StoreError::Task(e.to_string()).into()),
        }
    }
}

/// The version log as seen through one open SQLite transaction.
struct SqliteLog<'a> {
    conn: &'a Connection,
}

impl VersionLog for SqliteLog<'_> {
    fn insert_version(&mut self, row: &PaymentVersion) -> Result<usize> {
        let attributes = serde_json::to_string(&row.attributes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let inserted = self.conn.execute(
            "INSERT INTO payments (external_id, version, organisation_id, attributes, deleted)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                row.external_id.to_string(),
                row.version,
                row.organisation_id.to_string(),
                attributes,
                row.deleted,
            ],
        );

        match inserted {
            Ok(count) => {
                debug!(
                    external_id = %row.external_id,
                    version = row.version,
                    deleted = row.deleted,
                    "inserted payment version"
                );
                Ok(count)
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(StoreError::Conflict {
                    external_id: row.external_id,
                    version: row.version,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn current_version(&mut self, id: &PaymentId) -> Result<Option<PaymentVersion>> {
        let sql = format!(
            "{SELECT_COLUMNS} FROM payments WHERE external_id = ?1 ORDER BY version DESC LIMIT 1"
        );
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], row_to_version)
            .optional()?;
        Ok(row)
    }

    fn all_current_versions(&mut self) -> Result<Vec<PaymentVersion>> {
        let sql = format!(
            "{SELECT_COLUMNS}
             FROM payments p
             JOIN (
                 SELECT external_id AS latest_id, MAX(version) AS latest_version
                 FROM payments
                 GROUP BY external_id
             ) t ON t.latest_id = p.external_id AND t.latest_version = p.version
             WHERE p.deleted = 0
             ORDER BY p.external_id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_version)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn history(&mut self, id: &PaymentId) -> Result<Vec<PaymentVersion>> {
        let sql = format!("{SELECT_COLUMNS} FROM payments WHERE external_id = ?1 ORDER BY version");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![id.to_string()], row_to_version)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

// Helper to convert a row to PaymentVersion
fn row_to_version(row: &Row<'_>) -> rusqlite::Result<PaymentVersion> {
    let external_id: String = row.get("external_id")?;
    let organisation_id: String = row.get("organisation_id")?;
    let attributes: String = row.get("attributes")?;

    Ok(PaymentVersion {
        external_id: external_id
            .parse()
            .map_err(|e| conversion_error(0, rusqlite::types::Type::Text, e))?,
        version: row.get("version")?,
        organisation_id: organisation_id
            .parse()
            .map_err(|e| conversion_error(2, rusqlite::types::Type::Text, e))?,
        attributes: serde_json::from_str(&attributes)
            .map_err(|e| conversion_error(3, rusqlite::types::Type::Text, e))?,
        deleted: row.get("deleted")?,
    })
}

fn conversion_error<E>(column: usize, ty: rusqlite::types::Type, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(err))
}

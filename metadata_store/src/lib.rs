//! Relational metadata store for the upload registry.
//!
//! Holds the single `files` table tracking uploaded file names and their
//! signed access URLs. Built on an async SQLite pool (sqlx); the schema is
//! created idempotently on connect so fresh and existing databases are
//! handled the same way.

use std::{path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row, SqlitePool,
};
use tracing::debug;

/// SQLite busy timeout in milliseconds when the DB is under load.
const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

/// One persisted upload record.
///
/// `url` is the signed access URL captured at upload time; it is never
/// regenerated, so it can expire while the record persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub filename: String,
    pub url: String,
}

/// Primary entry point to the metadata store.
#[derive(Clone, Debug)]
pub struct MetadataStore {
    pool: SqlitePool,
}

impl MetadataStore {
    /// Establishes (or creates) a connection pool to the SQLite database at
    /// the given URL (e.g. `sqlite:///var/lib/filedepot/files.db`) and
    /// ensures the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_millis(SQLITE_BUSY_TIMEOUT_MS));

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(8)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Connects to a file path via `sqlite://` scheme.
    pub async fn connect_file(path: &Path) -> Result<Self, sqlx::Error> {
        let url = format!("sqlite://{}", path.display());
        Self::connect(&url).await
    }

    /// Creates the `files` table if it does not exist. Safe to call on
    /// every startup; an existing table is left untouched.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                url TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        debug!("files table ready");
        Ok(())
    }

    /// Exposes the underlying pool for composed queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts a new file record and returns it with its assigned id.
    /// The insert runs in an explicit transaction; on failure the
    /// transaction is rolled back before the error is reported.
    pub async fn insert_file(&self, filename: &str, url: &str) -> Result<FileRecord, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("INSERT INTO files (filename, url) VALUES (?, ?)")
            .bind(filename)
            .bind(url)
            .execute(&mut *tx)
            .await?;
        let id = result.last_insert_rowid();
        tx.commit().await?;

        Ok(FileRecord {
            id,
            filename: filename.to_owned(),
            url: url.to_owned(),
        })
    }

    /// Returns all file records in insertion order. All-or-nothing: a read
    /// failure surfaces no partial rows.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, filename, url FROM files ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(map_file).collect())
    }

    /// Deletes every record with the given filename (no uniqueness is
    /// enforced, so this may remove multiple rows). Returns the number of
    /// rows removed; zero rows is not an error.
    pub async fn delete_by_filename(&self, filename: &str) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM files WHERE filename = ?")
            .bind(filename)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }
}

fn map_file(row: SqliteRow) -> FileRecord {
    FileRecord {
        id: row.get("id"),
        filename: row.get("filename"),
        url: row.get("url"),
    }
}

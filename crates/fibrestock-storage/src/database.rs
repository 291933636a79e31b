// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use fibrestock_core::FibrestockError;
use tokio_rusqlite::Connection;

/// Handle to the SQLite database. Cheap to clone; all clones share the
/// same background connection thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file, apply PRAGMAs, and run migrations.
    pub async fn open(path: &str) -> Result<Self, FibrestockError> {
        let conn = Connection::open(path).await.map_err(map_sql_err)?;
        init(&conn, 5000).await?;
        Ok(Self { conn })
    }

    /// Open using the storage section of the application config.
    pub async fn open_with(
        config: &fibrestock_config::StorageConfig,
    ) -> Result<Self, FibrestockError> {
        let conn = Connection::open(&config.database_path)
            .await
            .map_err(map_sql_err)?;
        init(&conn, config.busy_timeout_ms).await?;
        Ok(Self { conn })
    }

    /// In-memory database for tests. Same PRAGMAs and migrations as `open`.
    pub async fn open_in_memory() -> Result<Self, FibrestockError> {
        let conn = Connection::open_in_memory().await.map_err(map_sql_err)?;
        init(&conn, 5000).await?;
        Ok(Self { conn })
    }

    /// Access the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL so readers of the main file see a consistent state.
    pub async fn checkpoint(&self) -> Result<(), FibrestockError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

async fn init(conn: &Connection, busy_timeout_ms: u64) -> Result<(), FibrestockError> {
    conn.call(move |conn| {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\n\
             PRAGMA foreign_keys = ON;\n\
             PRAGMA synchronous = NORMAL;\n\
             PRAGMA busy_timeout = {busy_timeout_ms};"
        ))?;
        Ok(crate::migrations::run_migrations(conn))
    })
    .await
    .map_err(map_tr_err)??;
    Ok(())
}

/// Map a tokio-rusqlite error into the domain storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> FibrestockError {
    FibrestockError::Storage {
        source: Box::new(e),
    }
}

/// Map a raw rusqlite error into the domain storage error. `Connection::open`
/// and friends fail before the background thread exists, so they hand back
/// `rusqlite::Error` directly.
fn map_sql_err(e: rusqlite::Error) -> FibrestockError {
    FibrestockError::Storage {
        source: Box::new(e),
    }
}

// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. The `Database` struct IS the single writer; query modules accept
//! `&Database` and call through `connection().call()`. Do NOT create
//! additional Connection instances for writes.

use std::path::Path;

use tokio_rusqlite::Connection;
use tracing::debug;

use formfact_core::FormfactError;

use crate::migrations;

/// Convert tokio-rusqlite errors into `FormfactError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> FormfactError {
    FormfactError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single SQLite connection.
///
/// Opening runs PRAGMA setup and all pending migrations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` and bring the schema up to date.
    pub async fn open(path: &str) -> Result<Database, FormfactError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| FormfactError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| FormfactError::Storage {
                source: Box::new(e),
            })?;
        Self::setup(&conn, true).await?;
        debug!(path, "database opened");
        Ok(Database { conn })
    }

    /// Open an in-memory database (tests).
    pub async fn open_in_memory() -> Result<Database, FormfactError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| FormfactError::Storage {
                source: Box::new(e),
            })?;
        // WAL is meaningless for in-memory databases.
        Self::setup(&conn, false).await?;
        Ok(Database { conn })
    }

    async fn setup(conn: &Connection, wal: bool) -> Result<(), FormfactError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            migrations::run_migrations(conn)
                .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))
        })
        .await
        .map_err(map_tr_err)
    }

    /// The underlying connection. All access goes through `call()`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and flush pending writes.
    pub async fn close(&self) -> Result<(), FormfactError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

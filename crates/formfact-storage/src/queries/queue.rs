// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embed queue operations for crash-safe, at-least-once embedding delivery.

use rusqlite::params;

use formfact_core::FormfactError;
use formfact_core::types::EmbedTask;

use crate::database::Database;

/// Enqueue an embedding task. Returns the auto-generated queue entry ID.
pub async fn enqueue(db: &Database, entry_id: &str, text: &str) -> Result<i64, FormfactError> {
    let entry_id = entry_id.to_string();
    let text = text.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO embed_queue (entry_id, text) VALUES (?1, ?2)",
                params![entry_id, text],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Dequeue the next pending embedding task.
///
/// Atomically selects the oldest pending task and marks it as "processing"
/// with a 5-minute lock timeout. Returns `None` if the queue is empty.
pub async fn dequeue(db: &Database) -> Result<Option<EmbedTask>, FormfactError> {
    db.connection()
        .call(move |conn| {
            // Transaction to atomically find + lock the next pending task.
            let tx = conn.transaction()?;

            let result = {
                let mut stmt = tx.prepare(
                    "SELECT id, entry_id, text, status, attempts, max_attempts,
                            created_at, updated_at, locked_until
                     FROM embed_queue
                     WHERE status = 'pending'
                     ORDER BY id ASC
                     LIMIT 1",
                )?;
                stmt.query_row([], |row| {
                    Ok(EmbedTask {
                        id: row.get(0)?,
                        entry_id: row.get(1)?,
                        text: row.get(2)?,
                        status: row.get(3)?,
                        attempts: row.get(4)?,
                        max_attempts: row.get(5)?,
                        created_at: row.get(6)?,
                        updated_at: row.get(7)?,
                        locked_until: row.get(8)?,
                    })
                })
            };

            match result {
                Ok(task) => {
                    tx.execute(
                        "UPDATE embed_queue SET status = 'processing',
                         locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+5 minutes'),
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![task.id],
                    )?;
                    tx.commit()?;

                    Ok(Some(EmbedTask {
                        status: "processing".to_string(),
                        ..task
                    }))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Acknowledge successful processing of a task: marks it "completed".
pub async fn ack(db: &Database, id: i64) -> Result<(), FormfactError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE embed_queue SET status = 'completed',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a task as failed.
///
/// Increments attempts. If attempts >= max_attempts, sets status to
/// "failed"; otherwise resets to "pending" for retry and clears the lock.
pub async fn fail(db: &Database, id: i64) -> Result<(), FormfactError> {
    db.connection()
        .call(move |conn| {
            let (attempts, max_attempts): (i32, i32) = conn.query_row(
                "SELECT attempts, max_attempts FROM embed_queue WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let new_attempts = attempts + 1;
            if new_attempts >= max_attempts {
                conn.execute(
                    "UPDATE embed_queue SET status = 'failed', attempts = ?1,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2",
                    params![new_attempts, id],
                )?;
            } else {
                conn.execute(
                    "UPDATE embed_queue SET status = 'pending', attempts = ?1,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2",
                    params![new_attempts, id],
                )?;
            }
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of tasks still pending delivery.
pub async fn pending_count(db: &Database) -> Result<i64, FormfactError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM embed_queue WHERE status = 'pending'",
                [],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

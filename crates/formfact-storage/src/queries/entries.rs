// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge entry CRUD and lookup operations.
//!
//! All lookups are owner-scoped. The verified partition is maintained by
//! [`upsert_verified`], which relies on the partial unique index
//! `(owner_id, group_key) WHERE verified = 1` so concurrent confirmations
//! collapse into one atomic in-place update instead of read-then-write.

use rusqlite::params;

use formfact_core::entry::{EntryKind, KnowledgeEntry};
use formfact_core::FormfactError;

use crate::database::Database;
use crate::models::{blob_to_vec, vec_to_blob};

const ENTRY_COLUMNS: &str = "id, owner_id, kind, group_key, label, label_key, payload, \
     confidence, verified, last_verified_at, provenance, embedding, \
     usage_count, last_used_at, created_at, updated_at";

/// Map a full entry row (in [`ENTRY_COLUMNS`] order) to a `KnowledgeEntry`.
fn row_to_entry(row: &rusqlite::Row) -> Result<KnowledgeEntry, rusqlite::Error> {
    let kind_str: String = row.get(2)?;
    let embedding_blob: Option<Vec<u8>> = row.get(11)?;
    Ok(KnowledgeEntry {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        kind: EntryKind::from_str_value(&kind_str),
        group_key: row.get(3)?,
        label: row.get(4)?,
        label_key: row.get(5)?,
        payload: row.get(6)?,
        confidence: row.get(7)?,
        verified: row.get(8)?,
        last_verified_at: row.get(9)?,
        provenance: row.get(10)?,
        embedding: embedding_blob.map(|b| blob_to_vec(&b)),
        usage_count: row.get(12)?,
        last_used_at: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

/// Insert a new entry row.
pub async fn insert_entry(db: &Database, entry: &KnowledgeEntry) -> Result<(), FormfactError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            let embedding_blob = entry.embedding.as_deref().map(vec_to_blob);
            conn.execute(
                "INSERT INTO entries (id, owner_id, kind, group_key, label, label_key, payload,
                     confidence, verified, last_verified_at, provenance, embedding,
                     usage_count, last_used_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    entry.id,
                    entry.owner_id,
                    entry.kind.as_str(),
                    entry.group_key,
                    entry.label,
                    entry.label_key,
                    entry.payload,
                    entry.confidence,
                    entry.verified,
                    entry.last_verified_at,
                    entry.provenance,
                    embedding_blob,
                    entry.usage_count,
                    entry.last_used_at,
                    entry.created_at,
                    entry.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a single entry by ID, scoped to the owner.
pub async fn get_entry(
    db: &Database,
    owner_id: &str,
    id: &str,
) -> Result<Option<KnowledgeEntry>, FormfactError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE owner_id = ?1 AND id = ?2");
            let mut stmt = conn.prepare(&sql)?;
            let result = stmt.query_row(params![owner_id, id], row_to_entry);
            match result {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Entries whose label equals `label` exactly, verified first, then by
/// descending confidence.
pub async fn exact_label_matches(
    db: &Database,
    owner_id: &str,
    label: &str,
) -> Result<Vec<KnowledgeEntry>, FormfactError> {
    let owner_id = owner_id.to_string();
    let label = label.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {ENTRY_COLUMNS} FROM entries
                 WHERE owner_id = ?1 AND label = ?2
                 ORDER BY verified DESC, confidence DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let entries = stmt
                .query_map(params![owner_id, label], row_to_entry)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Entries whose normalized label key is a substring or superset of
/// `label_key`, verified first, then by descending confidence.
pub async fn key_overlap_matches(
    db: &Database,
    owner_id: &str,
    label_key: &str,
) -> Result<Vec<KnowledgeEntry>, FormfactError> {
    let owner_id = owner_id.to_string();
    let label_key = label_key.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {ENTRY_COLUMNS} FROM entries
                 WHERE owner_id = ?1 AND label_key <> ''
                   AND (instr(?2, label_key) > 0 OR instr(label_key, ?2) > 0)
                 ORDER BY verified DESC, confidence DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let entries = stmt
                .query_map(params![owner_id, label_key], row_to_entry)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Distinct trimmed payloads among unverified entries whose label key
/// overlaps `label_key`.
pub async fn distinct_unverified_values(
    db: &Database,
    owner_id: &str,
    label_key: &str,
) -> Result<Vec<String>, FormfactError> {
    let owner_id = owner_id.to_string();
    let label_key = label_key.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT TRIM(payload) FROM entries
                 WHERE owner_id = ?1 AND verified = 0 AND label_key <> ''
                   AND (instr(?2, label_key) > 0 OR instr(label_key, ?2) > 0)",
            )?;
            let values = stmt
                .query_map(params![owner_id, label_key], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(values)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The canonical verified entry for a group, if one exists.
pub async fn verified_in_group(
    db: &Database,
    owner_id: &str,
    group_key: &str,
) -> Result<Option<KnowledgeEntry>, FormfactError> {
    let owner_id = owner_id.to_string();
    let group_key = group_key.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {ENTRY_COLUMNS} FROM entries
                 WHERE owner_id = ?1 AND group_key = ?2 AND verified = 1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let result = stmt.query_row(params![owner_id, group_key], row_to_entry);
            match result {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically upsert the canonical verified entry for a group.
///
/// `entry` must carry `verified = true`. If a verified row already exists
/// for (owner_id, group_key), its payload, confidence, verification
/// timestamp, and provenance are updated in place and its embedding is
/// cleared (the payload changed, so the vector must be regenerated whole).
/// Returns the ID of the canonical row, which is the existing row's ID on
/// conflict.
pub async fn upsert_verified(db: &Database, entry: &KnowledgeEntry) -> Result<String, FormfactError> {
    debug_assert!(entry.verified);
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO entries (id, owner_id, kind, group_key, label, label_key, payload,
                     confidence, verified, last_verified_at, provenance, embedding,
                     usage_count, last_used_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?10, NULL, 0, NULL, ?11, ?11)
                 ON CONFLICT (owner_id, group_key) WHERE verified = 1 DO UPDATE SET
                     label = excluded.label,
                     label_key = excluded.label_key,
                     payload = excluded.payload,
                     confidence = excluded.confidence,
                     last_verified_at = excluded.last_verified_at,
                     provenance = excluded.provenance,
                     embedding = NULL,
                     updated_at = excluded.updated_at",
                params![
                    entry.id,
                    entry.owner_id,
                    entry.kind.as_str(),
                    entry.group_key,
                    entry.label,
                    entry.label_key,
                    entry.payload,
                    entry.confidence,
                    entry.last_verified_at,
                    entry.provenance,
                    entry.updated_at,
                ],
            )?;
            conn.query_row(
                "SELECT id FROM entries WHERE owner_id = ?1 AND group_key = ?2 AND verified = 1",
                params![entry.owner_id, entry.group_key],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All stored embeddings for an owner as (entry_id, vector) pairs,
/// optionally restricted to one entry kind.
pub async fn owner_embeddings(
    db: &Database,
    owner_id: &str,
    kind: Option<EntryKind>,
) -> Result<Vec<(String, Vec<f32>)>, FormfactError> {
    let owner_id = owner_id.to_string();
    let kind_str = kind.map(|k| k.as_str().to_string());
    db.connection()
        .call(move |conn| {
            let results = match &kind_str {
                Some(kind) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, embedding FROM entries
                         WHERE owner_id = ?1 AND kind = ?2 AND embedding IS NOT NULL",
                    )?;
                    let rows = stmt.query_map(params![owner_id, kind], |row| {
                        let id: String = row.get(0)?;
                        let blob: Vec<u8> = row.get(1)?;
                        Ok((id, blob_to_vec(&blob)))
                    })?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, embedding FROM entries
                         WHERE owner_id = ?1 AND embedding IS NOT NULL",
                    )?;
                    let rows = stmt.query_map(params![owner_id], |row| {
                        let id: String = row.get(0)?;
                        let blob: Vec<u8> = row.get(1)?;
                        Ok((id, blob_to_vec(&blob)))
                    })?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
            };
            Ok(results)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Batch retrieval of entries by ID (after a vector search), owner-scoped.
pub async fn entries_by_ids(
    db: &Database,
    owner_id: &str,
    ids: &[String],
) -> Result<Vec<KnowledgeEntry>, FormfactError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let owner_id = owner_id.to_string();
    let ids = ids.to_vec();
    db.connection()
        .call(move |conn| {
            let placeholders: Vec<String> = (2..=ids.len() + 1).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "SELECT {ENTRY_COLUMNS} FROM entries
                 WHERE owner_id = ?1 AND id IN ({})",
                placeholders.join(", ")
            );
            let mut stmt = conn.prepare(&sql)?;

            let mut sql_params: Vec<&dyn rusqlite::types::ToSql> = vec![&owner_id];
            sql_params.extend(ids.iter().map(|id| id as &dyn rusqlite::types::ToSql));
            let entries = stmt
                .query_map(sql_params.as_slice(), row_to_entry)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Increment an entry's usage counter and stamp its last use.
///
/// Telemetry only; last write wins under concurrency.
pub async fn increment_usage(
    db: &Database,
    owner_id: &str,
    id: &str,
) -> Result<(), FormfactError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE entries SET usage_count = usage_count + 1,
                     last_used_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE owner_id = ?1 AND id = ?2",
                params![owner_id, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store a freshly generated embedding for an entry.
///
/// The vector always replaces the previous one whole.
pub async fn set_embedding(
    db: &Database,
    entry_id: &str,
    vector: &[f32],
) -> Result<(), FormfactError> {
    let entry_id = entry_id.to_string();
    let blob = vec_to_blob(vector);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE entries SET embedding = ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![blob, entry_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete all entries of one kind for an owner. Returns the number removed.
pub async fn purge_kind(
    db: &Database,
    owner_id: &str,
    kind: EntryKind,
) -> Result<usize, FormfactError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM entries WHERE owner_id = ?1 AND kind = ?2",
                params![owner_id, kind.as_str()],
            )?;
            Ok(removed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Entry counts per kind for an owner (status reporting).
pub async fn kind_counts(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<(String, i64)>, FormfactError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT kind, COUNT(*) FROM entries WHERE owner_id = ?1
                 GROUP BY kind ORDER BY kind",
            )?;
            let counts = stmt
                .query_map(params![owner_id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(counts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn make_entry(id: &str, label: &str, payload: &str, verified: bool) -> KnowledgeEntry {
        let label_key: String = label
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        KnowledgeEntry {
            id: id.to_string(),
            owner_id: "owner-1".to_string(),
            kind: EntryKind::DerivedFieldValue,
            group_key: label_key.clone(),
            label: label.to_string(),
            label_key,
            payload: payload.to_string(),
            confidence: if verified { 1.0 } else { 0.7 },
            verified,
            last_verified_at: verified.then(|| "2026-06-01T00:00:00.000Z".to_string()),
            provenance: "test".to_string(),
            embedding: None,
            usage_count: 0,
            last_used_at: None,
            created_at: "2026-06-01T00:00:00.000Z".to_string(),
            updated_at: "2026-06-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let db = Database::open_in_memory().await.unwrap();
        let mut entry = make_entry("e-1", "GPA", "Value: 3.8", true);
        entry.embedding = Some(vec![0.5; 8]);
        insert_entry(&db, &entry).await.unwrap();

        let fetched = get_entry(&db, "owner-1", "e-1").await.unwrap().unwrap();
        assert_eq!(fetched.label, "GPA");
        assert_eq!(fetched.payload, "Value: 3.8");
        assert!(fetched.verified);
        assert_eq!(fetched.kind, EntryKind::DerivedFieldValue);
        assert_eq!(fetched.embedding.as_deref(), Some(&[0.5_f32; 8][..]));
    }

    #[tokio::test]
    async fn get_entry_is_owner_scoped() {
        let db = Database::open_in_memory().await.unwrap();
        insert_entry(&db, &make_entry("e-1", "GPA", "Value: 3.8", true))
            .await
            .unwrap();
        assert!(get_entry(&db, "other-owner", "e-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exact_matches_ordered_verified_first() {
        let db = Database::open_in_memory().await.unwrap();
        let mut unverified = make_entry("e-1", "Email", "Value: old@x.com", false);
        unverified.group_key = "email-old".into();
        insert_entry(&db, &unverified).await.unwrap();
        insert_entry(&db, &make_entry("e-2", "Email", "Value: jane@x.com", true))
            .await
            .unwrap();

        let matches = exact_label_matches(&db, "owner-1", "Email").await.unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].verified);
        assert_eq!(matches[0].id, "e-2");
    }

    #[tokio::test]
    async fn key_overlap_matches_substring_and_superset() {
        let db = Database::open_in_memory().await.unwrap();
        insert_entry(&db, &make_entry("e-1", "Major", "Value: CS", false))
            .await
            .unwrap();

        // Query key is a superset of the stored key.
        let matches = key_overlap_matches(&db, "owner-1", "majorpleaseselect")
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);

        // Stored key is a superset of the query key.
        let matches = key_overlap_matches(&db, "owner-1", "major").await.unwrap();
        assert_eq!(matches.len(), 1);

        // Disjoint keys do not match.
        let matches = key_overlap_matches(&db, "owner-1", "hometown").await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn distinct_unverified_values_dedupes() {
        let db = Database::open_in_memory().await.unwrap();
        let mut a = make_entry("e-1", "Major", "Value: CS", false);
        a.group_key = "major-a".into();
        let mut b = make_entry("e-2", "Major", "Value: Computer Science", false);
        b.group_key = "major-b".into();
        let mut c = make_entry("e-3", "Major", "Value: CS", false);
        c.group_key = "major-c".into();
        for entry in [&a, &b, &c] {
            insert_entry(&db, entry).await.unwrap();
        }

        let mut values = distinct_unverified_values(&db, "owner-1", "major")
            .await
            .unwrap();
        values.sort();
        assert_eq!(values, vec!["Value: CS", "Value: Computer Science"]);
    }

    #[tokio::test]
    async fn upsert_verified_creates_then_updates_in_place() {
        let db = Database::open_in_memory().await.unwrap();

        let first = make_entry("e-1", "Email Address", "Value: jane@x.com", true);
        let id = upsert_verified(&db, &first).await.unwrap();
        assert_eq!(id, "e-1");

        // Second confirmation for the same group keeps one row, new payload.
        let mut second = make_entry("e-2", "Email Address", "Value: jane@y.com", true);
        second.group_key = first.group_key.clone();
        let id = upsert_verified(&db, &second).await.unwrap();
        assert_eq!(id, "e-1", "existing canonical row wins the ID");

        let canonical = verified_in_group(&db, "owner-1", &first.group_key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(canonical.payload, "Value: jane@y.com");

        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE verified = 1",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn upsert_verified_clears_stale_embedding() {
        let db = Database::open_in_memory().await.unwrap();
        let first = make_entry("e-1", "Email Address", "Value: jane@x.com", true);
        upsert_verified(&db, &first).await.unwrap();
        set_embedding(&db, "e-1", &[0.1; 8]).await.unwrap();

        let mut second = make_entry("e-2", "Email Address", "Value: jane@y.com", true);
        second.group_key = first.group_key.clone();
        upsert_verified(&db, &second).await.unwrap();

        let canonical = get_entry(&db, "owner-1", "e-1").await.unwrap().unwrap();
        assert!(
            canonical.embedding.is_none(),
            "payload change must clear the old vector"
        );
    }

    #[tokio::test]
    async fn unverified_entries_may_coexist_per_label() {
        let db = Database::open_in_memory().await.unwrap();
        let mut a = make_entry("e-1", "Major", "Value: CS", false);
        a.group_key = "major".into();
        let mut b = make_entry("e-2", "Major", "Value: Computer Science", false);
        b.group_key = "major".into();
        insert_entry(&db, &a).await.unwrap();
        // Same group, both unverified: the partial index does not apply.
        insert_entry(&db, &b).await.unwrap();

        let matches = exact_label_matches(&db, "owner-1", "Major").await.unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn owner_embeddings_filters_by_kind() {
        let db = Database::open_in_memory().await.unwrap();
        let mut derived = make_entry("e-1", "GPA", "Value: 3.8", true);
        derived.embedding = Some(vec![1.0, 0.0]);
        insert_entry(&db, &derived).await.unwrap();

        let mut essay = make_entry("e-2", "essay", "I grew up in Santa Fe.", false);
        essay.kind = EntryKind::Freeform;
        essay.embedding = Some(vec![0.0, 1.0]);
        insert_entry(&db, &essay).await.unwrap();

        let mut no_vector = make_entry("e-3", "Phone", "Value: 555-0100", false);
        no_vector.group_key = "phone".into();
        no_vector.embedding = None;
        insert_entry(&db, &no_vector).await.unwrap();

        let all = owner_embeddings(&db, "owner-1", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let derived_only = owner_embeddings(&db, "owner-1", Some(EntryKind::DerivedFieldValue))
            .await
            .unwrap();
        assert_eq!(derived_only.len(), 1);
        assert_eq!(derived_only[0].0, "e-1");
    }

    #[tokio::test]
    async fn entries_by_ids_batch() {
        let db = Database::open_in_memory().await.unwrap();
        for (id, label) in [("e-1", "GPA"), ("e-2", "Email"), ("e-3", "Phone")] {
            insert_entry(&db, &make_entry(id, label, "Value: x", false))
                .await
                .unwrap();
        }

        let entries = entries_by_ids(&db, "owner-1", &["e-1".into(), "e-3".into()])
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);

        let none = entries_by_ids(&db, "owner-1", &[]).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn increment_usage_stamps_last_used() {
        let db = Database::open_in_memory().await.unwrap();
        insert_entry(&db, &make_entry("e-1", "GPA", "Value: 3.8", true))
            .await
            .unwrap();

        increment_usage(&db, "owner-1", "e-1").await.unwrap();
        increment_usage(&db, "owner-1", "e-1").await.unwrap();

        let entry = get_entry(&db, "owner-1", "e-1").await.unwrap().unwrap();
        assert_eq!(entry.usage_count, 2);
        assert!(entry.last_used_at.is_some());
    }

    #[tokio::test]
    async fn purge_kind_removes_only_that_kind() {
        let db = Database::open_in_memory().await.unwrap();
        insert_entry(&db, &make_entry("e-1", "GPA", "Value: 3.8", true))
            .await
            .unwrap();
        let mut essay = make_entry("e-2", "essay", "Some prose.", false);
        essay.kind = EntryKind::Freeform;
        insert_entry(&db, &essay).await.unwrap();

        let removed = purge_kind(&db, "owner-1", EntryKind::Freeform).await.unwrap();
        assert_eq!(removed, 1);
        assert!(get_entry(&db, "owner-1", "e-2").await.unwrap().is_none());
        assert!(get_entry(&db, "owner-1", "e-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn kind_counts_groups_by_kind() {
        let db = Database::open_in_memory().await.unwrap();
        insert_entry(&db, &make_entry("e-1", "GPA", "Value: 3.8", true))
            .await
            .unwrap();
        let mut essay = make_entry("e-2", "essay", "Some prose.", false);
        essay.kind = EntryKind::Freeform;
        insert_entry(&db, &essay).await.unwrap();

        let counts = kind_counts(&db, "owner-1").await.unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts.contains(&("derived_field_value".to_string(), 1)));
        assert!(counts.contains(&("freeform".to_string(), 1)));
    }
}

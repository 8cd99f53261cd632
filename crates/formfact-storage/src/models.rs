// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types and BLOB codecs for storage entities.
//!
//! The canonical entity types live in `formfact-core` for use across
//! capability trait boundaries; this module re-exports them and holds the
//! f32-vector BLOB encoding shared by the query modules.

pub use formfact_core::entry::{EntryKind, KnowledgeEntry};
pub use formfact_core::types::EmbedTask;

/// Convert an f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert a SQLite BLOB back to an f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_roundtrip() {
        let original = vec![0.1_f32, 0.2, 0.3, -0.5, 1.0];
        let blob = vec_to_blob(&original);
        assert_eq!(blob.len(), original.len() * 4);
        let recovered = blob_to_vec(&blob);
        assert_eq!(original.len(), recovered.len());
        for (a, b) in original.iter().zip(recovered.iter()) {
            assert!((a - b).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn empty_blob_is_empty_vec() {
        assert!(blob_to_vec(&[]).is_empty());
        assert!(vec_to_blob(&[]).is_empty());
    }
}

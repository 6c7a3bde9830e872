pub mod local;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Column;

/// Local key-value persistence of a board's columns, so a screen can pick up
/// its working copy after teardown. Nothing in the board requires it.
/// Implementations: LocalSnapshotStore (JSON files), MemorySnapshotStore.
pub trait SnapshotStore: Send + Sync {
    /// Store the column collection under `key`, replacing any previous snapshot.
    fn save(&self, key: &str, columns: &[Column]) -> Result<(), StorageError>;

    /// Fetch the columns stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<Column>>, StorageError>;

    /// Drop the snapshot stored under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// What a snapshot store keeps per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub saved_at: DateTime<Utc>,
    pub columns: Vec<Column>,
}

impl BoardSnapshot {
    pub fn now(columns: &[Column]) -> Self {
        Self {
            saved_at: Utc::now(),
            columns: columns.to_vec(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid snapshot key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot (de)serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Characters a key may not contain because they are invalid in filenames.
const FORBIDDEN_KEY_CHARS: &[char] = &['<', '>', ':', '"', '\\', '/', '|', '?', '*'];

/// Reject empty keys, anything that could escape a storage directory and
/// anything that is not usable verbatim as a filename. A valid key maps to
/// exactly one file, so two keys never share a snapshot.
pub fn validate_key(key: &str) -> Result<&str, StorageError> {
    let trimmed = key.trim();
    if trimmed.is_empty()
        || trimmed.contains("..")
        || trimmed
            .chars()
            .any(|c| FORBIDDEN_KEY_CHARS.contains(&c) || c.is_control())
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}

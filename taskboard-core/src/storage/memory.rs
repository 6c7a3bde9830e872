use std::collections::HashMap;
use std::sync::RwLock;

use super::{validate_key, BoardSnapshot, SnapshotStore, StorageError};
use crate::types::Column;

/// Process-local snapshot store. Snapshots live as long as the store does.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<String, BoardSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full snapshot (columns plus save time) stored under `key`.
    pub fn snapshot(&self, key: &str) -> Result<Option<BoardSnapshot>, StorageError> {
        let key = validate_key(key)?;
        Ok(self.snapshots.read().unwrap().get(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, key: &str, columns: &[Column]) -> Result<(), StorageError> {
        let key = validate_key(key)?;
        self.snapshots
            .write()
            .unwrap()
            .insert(key.to_string(), BoardSnapshot::now(columns));
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<Column>>, StorageError> {
        let key = validate_key(key)?;
        Ok(self
            .snapshots
            .read()
            .unwrap()
            .get(key)
            .map(|s| s.columns.clone()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let key = validate_key(key)?;
        self.snapshots.write().unwrap().remove(key);
        Ok(())
    }
}

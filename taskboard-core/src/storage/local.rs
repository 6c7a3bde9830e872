/// Filesystem snapshot store.
///
/// One pretty-printed JSON file per key inside a directory, with:
/// - Atomic writes (write to .tmp, fsync, rename)
/// - SHA-256 of the serialized columns to skip rewriting unchanged boards
/// - Mutex-guarded writes so two saves of the same key never interleave
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use super::{validate_key, BoardSnapshot, SnapshotStore, StorageError};
use crate::types::Column;

pub struct LocalSnapshotStore {
    dir: PathBuf,
    /// snapshot file -> SHA-256 of the columns last written to it
    written_hashes: Mutex<HashMap<PathBuf, String>>,
    /// Per-file write mutex
    write_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl LocalSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written_hashes: Mutex::new(HashMap::new()),
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the snapshot for `key`.
    pub fn snapshot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        self.resolve(key).map(|(_, path)| path)
    }

    /// Validated key and its snapshot file. Valid keys are used verbatim as
    /// file stems, so distinct keys never resolve to the same file.
    fn resolve<'k>(&self, key: &'k str) -> Result<(&'k str, PathBuf), StorageError> {
        let key = validate_key(key)?;
        Ok((key, self.dir.join(format!("{}.json", key))))
    }

    /// Read the full snapshot (columns plus save time) for `key`.
    pub fn load_snapshot(&self, key: &str) -> Result<Option<BoardSnapshot>, StorageError> {
        let path = self.snapshot_path(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn content_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn get_write_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap();
        locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Atomic write with fsync: write to .tmp, fsync, rename, fsync directory.
    fn atomic_write(path: &Path, content: &str) -> Result<(), std::io::Error> {
        let tmp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;

        if let Some(dir) = path.parent() {
            if let Ok(d) = fs::File::open(dir) {
                let _ = d.sync_all();
            }
        }
        Ok(())
    }
}

impl SnapshotStore for LocalSnapshotStore {
    fn save(&self, key: &str, columns: &[Column]) -> Result<(), StorageError> {
        let (key, path) = self.resolve(key)?;

        let lock = self.get_write_lock(&path);
        let _guard = lock.lock().unwrap();

        let hash = Self::content_hash(&serde_json::to_string(columns)?);
        let unchanged = self
            .written_hashes
            .lock()
            .unwrap()
            .get(&path)
            .is_some_and(|h| *h == hash);
        if unchanged && path.exists() {
            log::debug!(
                "[taskboard.storage.save] Snapshot {} unchanged, skipping write",
                key
            );
            return Ok(());
        }

        let content = serde_json::to_string_pretty(&BoardSnapshot::now(columns))?;
        fs::create_dir_all(&self.dir)?;
        Self::atomic_write(&path, &content)?;

        log::debug!(
            "[taskboard.storage.save] Wrote snapshot {} ({} columns) to {:?}",
            key,
            columns.len(),
            path
        );
        self.written_hashes.lock().unwrap().insert(path, hash);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<Column>>, StorageError> {
        Ok(self.load_snapshot(key)?.map(|s| s.columns))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let (_, path) = self.resolve(key)?;

        let lock = self.get_write_lock(&path);
        let _guard = lock.lock().unwrap();

        self.written_hashes.lock().unwrap().remove(&path);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

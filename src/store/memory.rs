use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::{KEY_PREFIX, StudentStore, id_from_key, student_key};
use crate::error::{Error, Result};
use crate::saving::{Snapshot, load_snapshot, save_snapshot};

/// In-process store, optionally persisted to a snapshot file
///
/// Without a snapshot path the data lives only as long as the process.
/// With one, the file is read at start-up and rewritten after every change;
/// a change that cannot be written is not applied.
pub struct MemoryStore {
    hashes: RwLock<Snapshot>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty store that is never written to disk
    pub fn new() -> Self {
        MemoryStore {
            hashes: RwLock::new(HashMap::new()),
            snapshot_path: None,
        }
    }

    /// Create a store backed by a snapshot file
    ///
    /// # Arguments
    /// * `path` - Snapshot file; it is loaded if it already exists
    ///
    /// # Returns
    /// * `Result<MemoryStore>` - The store, or an error if an existing snapshot cannot be read
    pub fn with_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let hashes = if path.exists() {
            let snapshot = load_snapshot(&path)?;
            log::info!(
                "Loaded {} students from snapshot {}",
                snapshot.len(),
                path.display()
            );
            snapshot
        } else {
            HashMap::new()
        };

        Ok(MemoryStore {
            hashes: RwLock::new(hashes),
            snapshot_path: Some(path),
        })
    }

    /// Apply `change` to the stored hashes
    ///
    /// With a snapshot file the change is made on a copy, the copy is
    /// written on the blocking pool, and only then does it replace the live
    /// map. `change` returns false when it left the map untouched.
    async fn apply<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Snapshot) -> bool + Send,
    {
        let mut hashes = self.hashes.write().await;

        let Some(path) = self.snapshot_path.clone() else {
            change(&mut hashes);
            return Ok(());
        };

        let mut next = hashes.clone();
        if !change(&mut next) {
            return Ok(());
        }

        let saved = tokio::task::spawn_blocking(move || save_snapshot(&next, &path).map(|()| next))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))??;
        *hashes = saved;

        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn put_fields(&self, id: &str, fields: &[(&'static str, String)]) -> Result<()> {
        let key = student_key(id);
        self.apply(|hashes| {
            let hash = hashes.entry(key).or_default();
            for (field, value) in fields {
                hash.insert(field.to_string(), value.clone());
            }
            true
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<HashMap<String, String>>> {
        let hashes = self.hashes.read().await;
        Ok(hashes
            .get(&student_key(id))
            .filter(|hash| !hash.is_empty())
            .cloned())
    }

    async fn list(&self) -> Result<Vec<(String, HashMap<String, String>)>> {
        let hashes = self.hashes.read().await;
        Ok(hashes
            .iter()
            .filter(|(key, _)| key.starts_with(KEY_PREFIX))
            .filter_map(|(key, hash)| id_from_key(key).map(|id| (id.to_string(), hash.clone())))
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let key = student_key(id);
        self.apply(|hashes| hashes.remove(&key).is_some()).await
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

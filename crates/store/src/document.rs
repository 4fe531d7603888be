//! Document array store abstraction.
//!
//! A store maps a logical key (e.g. `social_friendships`) to an ordered
//! array of JSON records. The only operations are read-all and
//! overwrite-all; every query and filter happens in memory after a full
//! read. A failed write must leave the previous array intact, so callers
//! can treat a storage error as "no state changed".

use std::collections::HashMap;
use std::path::PathBuf;

use dexsocial_common::{AppError, AppResult};
use serde_json::Value;
use tokio::sync::RwLock;

/// Abstract key -> array-of-records persistence.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the full record array for a store key. A missing key reads as
    /// an empty array.
    async fn read_array(&self, key: &str) -> AppResult<Vec<Value>>;

    /// Replace the full record array for a store key.
    async fn write_array(&self, key: &str, rows: Vec<Value>) -> AppResult<()>;
}

/// In-memory store backend, used by tests and the `memory` config backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn read_array(&self, key: &str) -> AppResult<Vec<Value>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned().unwrap_or_default())
    }

    async fn write_array(&self, key: &str, rows: Vec<Value>) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.insert(key.to_string(), rows);
        Ok(())
    }
}

/// Local filesystem store backend: one `{key}.json` file per store key.
///
/// Writes go through a temp file and a rename so a crash mid-write never
/// leaves a half-written array behind.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base_dir: PathBuf,
}

impl LocalStore {
    /// Create a local store rooted at `base_dir`. The directory is created
    /// lazily on first write.
    #[must_use]
    pub const fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

#[async_trait::async_trait]
impl DocumentStore for LocalStore {
    async fn read_array(&self, key: &str) -> AppResult<Vec<Value>> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Storage(format!("Failed to read {key}: {e}"))),
        };

        let rows: Vec<Value> = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Storage(format!("Malformed store file for {key}: {e}")))?;
        Ok(rows)
    }

    async fn write_array(&self, key: &str, rows: Vec<Value>) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create store dir: {e}")))?;

        let bytes = serde_json::to_vec_pretty(&rows)
            .map_err(|e| AppError::Storage(format!("Failed to encode {key}: {e}")))?;

        let path = self.path_for(key);
        let tmp = self.base_dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {key}: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to commit {key}: {e}")))?;
        Ok(())
    }
}

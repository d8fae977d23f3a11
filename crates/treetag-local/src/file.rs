//! Local state persisted as a JSON object on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use treetag_core::error::{AppError, ErrorKind};
use treetag_core::result::AppResult;
use treetag_core::traits::local_store::LocalStore;

/// File-backed local state.
///
/// The whole map is loaded once and rewritten through a sibling temp file
/// on every change, so a crash leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and treated as empty.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Local state is corrupt; starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read local state {}", path.display()),
                    e,
                ));
            }
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened local state");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl LocalStore for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        let next = BTreeMap::new();
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{AUTH_TOKEN, SCAN_COUNT};

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state").join("local.json");

        let store = FileStore::open(&path).await.expect("open");
        store.set(AUTH_TOKEN, "tok").await.expect("set");
        store.incr(SCAN_COUNT).await.expect("incr");
        drop(store);

        let reopened = FileStore::open(&path).await.expect("reopen");
        assert_eq!(reopened.get(AUTH_TOKEN).await.expect("get").as_deref(), Some("tok"));
        assert_eq!(reopened.get_counter(SCAN_COUNT).await.expect("get"), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("local.json");
        tokio::fs::write(&path, "not json").await.expect("write");

        let store = FileStore::open(&path).await.expect("open");
        assert!(store.get(AUTH_TOKEN).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_clear_empties_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("local.json");
        let store = FileStore::open(&path).await.expect("open");
        store.set(AUTH_TOKEN, "tok").await.expect("set");
        store.clear().await.expect("clear");

        let text = tokio::fs::read_to_string(&path).await.expect("read");
        assert_eq!(text.trim(), "{}");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("local.json");
        let store = FileStore::open(&path).await.expect("open");
        store.set(AUTH_TOKEN, "tok").await.expect("set");

        // A directory where the temp file goes makes every write fail.
        tokio::fs::create_dir(path.with_extension("json.tmp"))
            .await
            .expect("block temp file");

        assert!(store.set(AUTH_TOKEN, "other").await.is_err());
        assert!(store.remove(AUTH_TOKEN).await.is_err());
        assert!(store.clear().await.is_err());
        assert_eq!(store.get(AUTH_TOKEN).await.expect("get").as_deref(), Some("tok"));

        let reopened = FileStore::open(&path).await.expect("reopen");
        assert_eq!(reopened.get(AUTH_TOKEN).await.expect("get").as_deref(), Some("tok"));
    }
}

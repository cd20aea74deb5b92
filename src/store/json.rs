use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::SeenStore;
use crate::models::{EntryIdentity, SeenRecord};
use crate::utils::error::Result;

type SeenMap = BTreeMap<EntryIdentity, SeenRecord>;

/// Seen-state kept in one pretty-printed JSON object on disk.
///
/// Every insert rewrites the whole file (temp file, then rename). Simple
/// over fast: the file only grows when a notification goes out. Entries are
/// never expired.
pub struct JsonSeenStore {
    path: PathBuf,
    entries: Mutex<SeenMap>,
}

impl JsonSeenStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<SeenMap>(&bytes) {
                Ok(entries) => {
                    debug!(path = %path.display(), entries = entries.len(), "Loaded seen state");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Seen state is corrupt, starting empty");
                    SeenMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SeenMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Seen state unreadable, starting empty");
                SeenMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn get(&self, identity: &EntryIdentity) -> Option<SeenRecord> {
        self.entries.lock().await.get(identity).cloned()
    }

    async fn persist(&self, entries: &SeenMap) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl SeenStore for JsonSeenStore {
    async fn is_seen(&self, identity: &EntryIdentity) -> Result<bool> {
        Ok(self.entries.lock().await.contains_key(identity))
    }

    async fn record(&self, identity: EntryIdentity, record: SeenRecord) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&identity) {
            return Ok(());
        }
        entries.insert(identity, record);
        self.persist(&entries).await
    }
}

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::{Invitation, RsvpEntry};
use crate::store::{InvitationStore, RsvpStore};

/// Directory used when the deployment does not configure one
pub const DEFAULT_DATA_DIR: &str = "invitations";

/// File-backed record store.
///
/// One pretty-printed JSON file per record under `data_dir`: `{id}.json`
/// for invitations and `rsvp_{id}.json` for RSVP lists. Every write lands
/// in a temporary file first and is renamed into place, so an interrupted
/// process never leaves a half-written record. Read-modify-write sequences
/// run under an advisory per-record lock.
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Default for FileStore {
    fn default() -> Self {
        FileStore::new(DEFAULT_DATA_DIR)
    }
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        FileStore {
            data_dir: data_dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn invitation_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", id))
    }

    pub fn rsvp_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("rsvp_{}.json", id))
    }

    // Ids are embedded in file names, so anything that could escape the
    // data directory is rejected outright.
    fn check_id(id: &str) -> Result<(), StoreError> {
        if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(())
    }

    async fn record_lock(&self, key: String) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn write_atomic(&self, path: &Path, content: String) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            StoreError::StorageUnavailable(format!("{}: {}", self.data_dir.display(), e))
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::StorageUnavailable(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::StorageUnavailable(format!("{}: {}", path.display(), e)))
    }

    async fn read_rsvp_list(&self, invitation_id: &str) -> Result<Vec<RsvpEntry>, StoreError> {
        let path = self.rsvp_path(invitation_id);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::StorageUnavailable(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("Unreadable RSVP list {}: {}", path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    async fn write_rsvp_list(
        &self,
        invitation_id: &str,
        entries: &[RsvpEntry],
    ) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.write_atomic(&self.rsvp_path(invitation_id), body).await
    }
}

#[async_trait]
impl InvitationStore for FileStore {
    async fn put_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        Self::check_id(&invitation.id)?;
        let lock = self
            .record_lock(format!("invitation:{}", invitation.id))
            .await;
        let _guard = lock.lock().await;

        let body = serde_json::to_string_pretty(invitation)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.write_atomic(&self.invitation_path(&invitation.id), body)
            .await
    }

    async fn get_invitation(&self, id: &str) -> Result<Invitation, StoreError> {
        Self::check_id(id)?;
        let path = self.invitation_path(id);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => {
                return Err(StoreError::StorageUnavailable(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };
        match serde_json::from_str::<Invitation>(&raw) {
            Ok(mut invitation) => {
                // The body never carries the id; restore it from the key
                invitation.id = id.to_string();
                Ok(invitation)
            }
            Err(e) => {
                warn!("Unreadable invitation record {}: {}", path.display(), e);
                Err(StoreError::NotFound(id.to_string()))
            }
        }
    }
}

#[async_trait]
impl RsvpStore for FileStore {
    async fn get_rsvps(&self, invitation_id: &str) -> Result<Vec<RsvpEntry>, StoreError> {
        Self::check_id(invitation_id)?;
        self.read_rsvp_list(invitation_id).await
    }

    async fn append_rsvp(
        &self,
        invitation_id: &str,
        entry: RsvpEntry,
    ) -> Result<Vec<RsvpEntry>, StoreError> {
        Self::check_id(invitation_id)?;
        let lock = self.record_lock(format!("rsvp:{}", invitation_id)).await;
        let _guard = lock.lock().await;

        let mut entries = self.read_rsvp_list(invitation_id).await?;
        entries.push(entry);
        self.write_rsvp_list(invitation_id, &entries).await?;
        Ok(entries)
    }

    async fn replace_rsvps(
        &self,
        invitation_id: &str,
        entries: &[RsvpEntry],
    ) -> Result<(), StoreError> {
        Self::check_id(invitation_id)?;
        let lock = self.record_lock(format!("rsvp:{}", invitation_id)).await;
        let _guard = lock.lock().await;
        self.write_rsvp_list(invitation_id, entries).await
    }
}

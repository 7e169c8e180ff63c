use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::{Invitation, RsvpEntry};
use crate::store::{InvitationStore, RsvpStore};

/// In-memory store for handler tests; implements both record traits
#[derive(Default)]
pub struct MockRecordStore {
    invitations: Mutex<HashMap<String, Invitation>>,
    rsvps: Mutex<HashMap<String, Vec<RsvpEntry>>>,
    fail_writes: bool,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose writes all report an unavailable medium
    pub fn failing() -> Self {
        MockRecordStore {
            fail_writes: true,
            ..Default::default()
        }
    }

    /// Seeds an invitation without going through a handler
    pub async fn seed_invitation(&self, invitation: Invitation) {
        self.invitations
            .lock()
            .await
            .insert(invitation.id.clone(), invitation);
    }

    pub async fn seed_rsvps(&self, invitation_id: &str, entries: Vec<RsvpEntry>) {
        self.rsvps
            .lock()
            .await
            .insert(invitation_id.to_string(), entries);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::StorageUnavailable(
                "mock store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl InvitationStore for MockRecordStore {
    async fn put_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        self.check_writable()?;
        self.invitations
            .lock()
            .await
            .insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }

    async fn get_invitation(&self, id: &str) -> Result<Invitation, StoreError> {
        self.invitations
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl RsvpStore for MockRecordStore {
    async fn get_rsvps(&self, invitation_id: &str) -> Result<Vec<RsvpEntry>, StoreError> {
        Ok(self
            .rsvps
            .lock()
            .await
            .get(invitation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_rsvp(
        &self,
        invitation_id: &str,
        entry: RsvpEntry,
    ) -> Result<Vec<RsvpEntry>, StoreError> {
        self.check_writable()?;
        let mut rsvps = self.rsvps.lock().await;
        let entries = rsvps.entry(invitation_id.to_string()).or_default();
        entries.push(entry);
        Ok(entries.clone())
    }

    async fn replace_rsvps(
        &self,
        invitation_id: &str,
        entries: &[RsvpEntry],
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        self.rsvps
            .lock()
            .await
            .insert(invitation_id.to_string(), entries.to_vec());
        Ok(())
    }
}

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Invitation, RsvpEntry};

pub mod file;

/// Persistence for invitation records
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Serializes and fully replaces the slot for `invitation.id`
    async fn put_invitation(&self, invitation: &Invitation) -> Result<(), StoreError>;

    /// Fetches a record; a missing or unreadable record is `NotFound`
    async fn get_invitation(&self, id: &str) -> Result<Invitation, StoreError>;
}

/// Persistence for per-invitation RSVP lists
#[async_trait]
pub trait RsvpStore: Send + Sync {
    /// Current list for the invitation; empty when absent or unreadable
    async fn get_rsvps(&self, invitation_id: &str) -> Result<Vec<RsvpEntry>, StoreError>;

    /// Appends one entry and returns the full updated list
    async fn append_rsvp(
        &self,
        invitation_id: &str,
        entry: RsvpEntry,
    ) -> Result<Vec<RsvpEntry>, StoreError>;

    /// Wholesale replaces the list (administrative edits and clear-all)
    async fn replace_rsvps(
        &self,
        invitation_id: &str,
        entries: &[RsvpEntry],
    ) -> Result<(), StoreError>;
}

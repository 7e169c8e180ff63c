use std::path::Path;

use log::{info, warn};

use fete_shared::backup;
use fete_shared::models::{now_str, RsvpEntry};
use fete_shared::store::{InvitationStore, RsvpStore};
use notification_service::send_rsvp_alert;

use crate::analytics::{self, RsvpSummary};
use crate::error::{AppError, Result};
use crate::models::{RsvpRequest, SubmitRsvpOutcome, UpdateRsvpRequest};

// Submit RSVP
//
// The entry is durable before the manager alert is attempted; a failed
// alert is carried in the outcome, never surfaced as an error.
pub async fn submit_rsvp<S>(
    store: &S,
    data_dir: &Path,
    invitation_id: &str,
    payload: RsvpRequest,
) -> Result<SubmitRsvpOutcome>
where
    S: InvitationStore + RsvpStore + ?Sized,
{
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("Guest name is required".to_string()));
    }
    if payload.response.trim().is_empty() {
        return Err(AppError::bad_request("Response is required".to_string()));
    }

    let invitation = store.get_invitation(invitation_id).await?;

    let entry = payload.into_entry();
    let entries = store.append_rsvp(invitation_id, entry.clone()).await?;
    info!(
        "Recorded RSVP from {} for invitation {}",
        entry.name, invitation_id
    );
    let entries = backup::backup_rsvp_list(store, data_dir, invitation_id, &entries, &entry).await;

    let (notification_sent, notification_detail) = match send_rsvp_alert(&invitation, &entry).await
    {
        Ok(detail) => (true, detail),
        Err(e) => {
            warn!("RSVP alert for invitation {} not sent: {}", invitation_id, e);
            (false, e.to_string())
        }
    };

    // Hand back the persisted entry with its backup status resolved
    let stored = entries
        .into_iter()
        .find(|e| e.name == entry.name && e.timestamp == entry.timestamp)
        .unwrap_or(entry);

    Ok(SubmitRsvpOutcome {
        entry: stored,
        notification_sent,
        notification_detail,
    })
}

// List RSVPs
pub async fn list_rsvps<S>(store: &S, invitation_id: &str) -> Result<Vec<RsvpEntry>>
where
    S: RsvpStore + ?Sized,
{
    Ok(store.get_rsvps(invitation_id).await?)
}

// Update RSVP
//
// In-place edit of one entry, matched by guest name and submission
// timestamp. The rewritten list is mirrored to the backup remote; no
// timestamped duplicate is taken for an edit.
pub async fn update_rsvp<S>(
    store: &S,
    data_dir: &Path,
    invitation_id: &str,
    payload: UpdateRsvpRequest,
) -> Result<RsvpEntry>
where
    S: RsvpStore + ?Sized,
{
    let mut entries = store.get_rsvps(invitation_id).await?;
    let position = entries
        .iter()
        .position(|e| e.name == payload.name && e.timestamp == payload.timestamp)
        .ok_or_else(|| {
            AppError::not_found(format!(
                "No RSVP from {} at {} in invitation {}",
                payload.name, payload.timestamp, invitation_id
            ))
        })?;

    let entry = &mut entries[position];
    entry.response = payload.response;
    entry.adults = payload.adults;
    entry.kids = payload.kids;
    entry.total_guests = payload.adults + payload.kids;
    entry.last_modified = Some(now_str());
    let updated = entry.clone();

    store.replace_rsvps(invitation_id, &entries).await?;
    info!(
        "Updated RSVP from {} in invitation {}",
        updated.name, invitation_id
    );

    backup::mirror_rsvp_update(data_dir, invitation_id, &updated.name).await;

    Ok(updated)
}

// Clear RSVPs
//
// Replaces the list with an empty one; the backup pipeline is not invoked.
pub async fn clear_rsvps<S>(store: &S, invitation_id: &str) -> Result<()>
where
    S: RsvpStore + ?Sized,
{
    store.replace_rsvps(invitation_id, &[]).await?;
    info!("Cleared RSVP list for invitation {}", invitation_id);
    Ok(())
}

// RSVP summary
pub async fn rsvp_summary<S>(store: &S, invitation_id: &str) -> Result<RsvpSummary>
where
    S: RsvpStore + ?Sized,
{
    let entries = store.get_rsvps(invitation_id).await?;
    Ok(analytics::summarize(&entries))
}

// Export RSVPs as CSV
pub async fn export_rsvps_csv<S>(store: &S, invitation_id: &str) -> Result<String>
where
    S: RsvpStore + ?Sized,
{
    let entries = store.get_rsvps(invitation_id).await?;
    Ok(analytics::to_csv(&entries))
}

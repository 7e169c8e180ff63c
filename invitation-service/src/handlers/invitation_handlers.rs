use std::path::Path;

use log::info;
use serde_json::{Map, Value};
use uuid::Uuid;

use fete_shared::backup;
use fete_shared::models::Invitation;
use fete_shared::store::{InvitationStore, RsvpStore};

use crate::error::{AppError, Result};
use crate::models::{missing_required_fields, CreateInvitationRequest, RsvpRequest};

// Create invitation
pub async fn create_invitation<S>(
    store: &S,
    data_dir: &Path,
    payload: CreateInvitationRequest,
) -> Result<Invitation>
where
    S: InvitationStore + ?Sized,
{
    let invitation = build_invitation(Uuid::new_v4().to_string(), payload.fields)?;
    store.put_invitation(&invitation).await?;
    info!("Created invitation {}", invitation.id);

    // The record is durable before any backup step runs
    Ok(backup::backup_invitation(store, data_dir, &invitation).await)
}

// Recreate invitation
//
// Recovery path: writes the record under a caller-supplied id, overwriting
// whatever is there, and optionally replays RSVP entries through the normal
// append pipeline. Replayed entries never trigger notifications.
pub async fn recreate_invitation<S>(
    store: &S,
    data_dir: &Path,
    id: &str,
    fields: Map<String, Value>,
    rsvps: Option<Vec<RsvpRequest>>,
) -> Result<Invitation>
where
    S: InvitationStore + RsvpStore + ?Sized,
{
    let invitation = build_invitation(id.to_string(), fields)?;
    store.put_invitation(&invitation).await?;
    info!("Recreated invitation {}", id);
    let invitation = backup::backup_invitation(store, data_dir, &invitation).await;

    if let Some(requests) = rsvps {
        for request in requests {
            let entry = request.into_entry();
            let entries = store.append_rsvp(id, entry.clone()).await?;
            backup::backup_rsvp_list(store, data_dir, id, &entries, &entry).await;
        }
    }

    Ok(invitation)
}

// Get invitation
pub async fn get_invitation<S>(store: &S, id: &str) -> Result<Invitation>
where
    S: InvitationStore + ?Sized,
{
    Ok(store.get_invitation(id).await?)
}

fn build_invitation(id: String, fields: Map<String, Value>) -> Result<Invitation> {
    let missing = missing_required_fields(&fields);
    if !missing.is_empty() {
        return Err(AppError::bad_request(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    Ok(Invitation::new(id, fields))
}

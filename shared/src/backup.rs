use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use log::{error, info, warn};
use tokio::process::Command;
use tokio::time::timeout;

use crate::models::{BackupStatus, EntrySafetyMetadata, Invitation, RsvpEntry, SafetyMetadata};
use crate::store::{InvitationStore, RsvpStore};

const GIT_STEP_TIMEOUT: Duration = Duration::from_secs(10);
const BACKUP_TS_FORMAT: &str = "%Y%m%d_%H%M%S%3f";

/// Backs up an invitation record after a successful primary write.
///
/// Best-effort, in order: mirror the record file to the version-control
/// remote, write a timestamped duplicate alongside it, then record the
/// mirror outcome in the record's backup metadata and re-persist. Nothing
/// here can fail the primary write; every failure is logged and reflected
/// in the returned record's `backup_status` at worst.
pub async fn backup_invitation<S>(store: &S, data_dir: &Path, invitation: &Invitation) -> Invitation
where
    S: InvitationStore + ?Sized,
{
    let file_name = format!("{}.json", invitation.id);
    let message = format!(
        "Auto-commit invitation: {}",
        invitation.event_name().unwrap_or("Unknown Event")
    );
    let mirrored = mirror_record(data_dir, &file_name, &message).await;

    match serde_json::to_string_pretty(invitation) {
        Ok(body) => {
            let copy_name = format!("backup_{}_{}.json", invitation.id, backup_timestamp());
            write_duplicate(data_dir, &copy_name, &body).await;
        }
        Err(e) => error!(
            "Failed to serialize invitation {} for its backup copy: {}",
            invitation.id, e
        ),
    }

    let status = if mirrored {
        BackupStatus::Completed
    } else {
        BackupStatus::Failed
    };
    let mut updated = invitation.clone();
    updated
        .safety_metadata
        .get_or_insert_with(SafetyMetadata::pending)
        .resolve(status);

    // If this second write fails the status update is lost, never the record
    if let Err(e) = store.put_invitation(&updated).await {
        warn!(
            "Failed to record backup status for invitation {}: {}",
            updated.id, e
        );
    }
    updated
}

/// Backs up an RSVP list after a successful append.
///
/// Same pipeline as [`backup_invitation`]; the mirror outcome lands on the
/// just-appended entry, located by name and timestamp.
pub async fn backup_rsvp_list<S>(
    store: &S,
    data_dir: &Path,
    invitation_id: &str,
    entries: &[RsvpEntry],
    new_entry: &RsvpEntry,
) -> Vec<RsvpEntry>
where
    S: RsvpStore + ?Sized,
{
    let file_name = format!("rsvp_{}.json", invitation_id);
    let guest = if new_entry.name.is_empty() {
        "Unknown Guest"
    } else {
        &new_entry.name
    };
    let message = format!(
        "Auto-commit RSVP for invitation {}: {}",
        invitation_id, guest
    );
    let mirrored = mirror_record(data_dir, &file_name, &message).await;

    match serde_json::to_string_pretty(entries) {
        Ok(body) => {
            let copy_name = format!(
                "backup_rsvp_{}_{}.json",
                invitation_id,
                backup_timestamp()
            );
            write_duplicate(data_dir, &copy_name, &body).await;
        }
        Err(e) => error!(
            "Failed to serialize RSVP list {} for its backup copy: {}",
            invitation_id, e
        ),
    }

    let status = if mirrored {
        BackupStatus::Completed
    } else {
        BackupStatus::Failed
    };
    let mut updated = entries.to_vec();
    for entry in updated
        .iter_mut()
        .filter(|e| e.name == new_entry.name && e.timestamp == new_entry.timestamp)
    {
        entry
            .safety_metadata
            .get_or_insert_with(|| EntrySafetyMetadata::pending(new_entry.timestamp.clone()))
            .resolve(status);
    }

    if let Err(e) = store.replace_rsvps(invitation_id, &updated).await {
        warn!(
            "Failed to record backup status for RSVP list {}: {}",
            invitation_id, e
        );
    }
    updated
}

/// Mirrors an administrative RSVP edit; no duplicate copy, no status update
pub async fn mirror_rsvp_update(data_dir: &Path, invitation_id: &str, guest_name: &str) -> bool {
    let file_name = format!("rsvp_{}.json", invitation_id);
    let message = format!(
        "Update RSVP for {} in invitation {}",
        guest_name, invitation_id
    );
    mirror_record(data_dir, &file_name, &message).await
}

/// Stages, commits and pushes one record file; the first failing step
/// skips the rest
async fn mirror_record(data_dir: &Path, file_name: &str, message: &str) -> bool {
    let result = async {
        git_step(data_dir, &["add", file_name]).await?;
        git_step(data_dir, &["commit", "-m", message]).await?;
        git_step(data_dir, &["push"]).await
    }
    .await;

    match result {
        Ok(()) => {
            info!("Mirrored {} to the backup remote", file_name);
            true
        }
        Err(e) => {
            warn!("Backup mirror skipped for {}: {}", file_name, e);
            false
        }
    }
}

async fn git_step(data_dir: &Path, args: &[&str]) -> Result<(), String> {
    let rendered = format!("git {}", args.join(" "));
    let output = timeout(
        GIT_STEP_TIMEOUT,
        Command::new("git").args(args).current_dir(data_dir).output(),
    )
    .await
    .map_err(|_| format!("{} timed out", rendered))?
    .map_err(|e| format!("{} could not start: {}", rendered, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", rendered, stderr.trim()));
    }
    Ok(())
}

async fn write_duplicate(data_dir: &Path, file_name: &str, content: &str) {
    let path = data_dir.join(file_name);
    match tokio::fs::write(&path, content).await {
        Ok(()) => info!("Backup copy written: {}", path.display()),
        Err(e) => error!("Failed to write backup copy {}: {}", path.display(), e),
    }
}

fn backup_timestamp() -> String {
    Utc::now().format(BACKUP_TS_FORMAT).to_string()
}

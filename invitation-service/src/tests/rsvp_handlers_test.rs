use std::env;
use std::sync::{Mutex, MutexGuard};

use log::{debug, info};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

use fete_shared::models::{BackupStatus, Invitation, RsvpEntry};
use fete_shared::store::RsvpStore;
use fete_shared::test_utils::mock_store::MockRecordStore;
use fete_shared::test_utils::test_logging::init_test_logging;

use crate::error::AppError;
use crate::handlers::rsvp_handlers::{
    clear_rsvps, export_rsvps_csv, list_rsvps, rsvp_summary, submit_rsvp, update_rsvp,
};
use crate::models::{RsvpRequest, UpdateRsvpRequest};

// Tests that reach the notification path read SMTP settings from the
// process environment, so they serialize on this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn clear_smtp_env() {
    for key in [
        "SMTP_USER",
        "SMTP_PASS",
        "SMTP_HOST",
        "SMTP_PORT",
        "SMTP_TLS",
    ] {
        env::remove_var(key);
    }
    // Point the secrets fallback at a path that cannot exist
    env::set_var("SECRETS_FILE", "/nonexistent/secrets.toml");
}

fn create_test_env() -> (MockRecordStore, TempDir) {
    init_test_logging();
    let data_dir = tempfile::tempdir().unwrap();
    (MockRecordStore::new(), data_dir)
}

fn gala_fields() -> Map<String, Value> {
    json!({
        "event_name": "Garden Gala",
        "host_names": "Mia & Noor",
        "event_date": "2025-09-20",
        "event_time": "6:00 PM",
        "venue_address": "12 Orchard Lane",
        "invitation_message": "Join us under the lanterns",
        "manager_email": "mia@example.com"
    })
    .as_object()
    .unwrap()
    .clone()
}

async fn seed_invitation(store: &MockRecordStore, id: &str) {
    store
        .seed_invitation(Invitation::new(id.to_string(), gala_fields()))
        .await;
}

fn rsvp_request(name: &str, response: &str, adults: u32, kids: u32) -> RsvpRequest {
    RsvpRequest {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        response: response.to_string(),
        adults,
        kids,
        message: String::new(),
    }
}

#[tokio::test]
async fn test_submit_rsvp_persists_even_when_alert_unconfigured() {
    let _guard = env_lock();
    clear_smtp_env();
    let (store, data_dir) = create_test_env();
    seed_invitation(&store, "inv-1").await;

    let outcome = submit_rsvp(&store, data_dir.path(), "inv-1", rsvp_request("Ana", "Yes", 2, 1))
        .await
        .unwrap();

    assert!(!outcome.notification_sent);
    assert_eq!(outcome.notification_detail, "SMTP not configured");
    assert_eq!(outcome.entry.name, "Ana");
    assert_eq!(outcome.entry.total_guests, 3);
    // The list write happened before the alert was even attempted
    let entries = store.get_rsvps("inv-1").await.unwrap();
    assert_eq!(entries.len(), 1, "Entry must be durable despite the alert outcome");
    info!("Entry persisted with detail: {}", outcome.notification_detail);
}

#[tokio::test]
async fn test_submit_rsvp_reports_resolved_backup_status() {
    let _guard = env_lock();
    clear_smtp_env();
    let (store, data_dir) = create_test_env();
    seed_invitation(&store, "inv-2").await;

    let outcome = submit_rsvp(&store, data_dir.path(), "inv-2", rsvp_request("Ben", "No", 1, 0))
        .await
        .unwrap();

    // Scratch directory is not a git work tree, so the mirror fails fast
    let metadata = outcome.entry.safety_metadata.as_ref().unwrap();
    assert_eq!(metadata.backup_status, BackupStatus::Failed);
    assert!(metadata.backup_timestamp.is_some());
}

#[tokio::test]
async fn test_submit_rsvp_flags_malformed_manager_address() {
    let _guard = env_lock();
    clear_smtp_env();
    let (store, data_dir) = create_test_env();
    let mut fields = gala_fields();
    fields.insert("manager_email".to_string(), json!("not-an-address"));
    store
        .seed_invitation(Invitation::new("inv-3".to_string(), fields))
        .await;

    let outcome = submit_rsvp(&store, data_dir.path(), "inv-3", rsvp_request("Cal", "Yes", 1, 0))
        .await
        .unwrap();

    assert!(!outcome.notification_sent);
    assert_eq!(
        outcome.notification_detail,
        "Invalid email address: not-an-address"
    );
    // Still persisted
    assert_eq!(store.get_rsvps("inv-3").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_submit_rsvp_requires_name_and_response() {
    let (store, data_dir) = create_test_env();
    seed_invitation(&store, "inv-4").await;

    let err = submit_rsvp(&store, data_dir.path(), "inv-4", rsvp_request("   ", "Yes", 1, 0))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Guest name is required");

    let err = submit_rsvp(&store, data_dir.path(), "inv-4", rsvp_request("Ana", "", 1, 0))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Response is required");

    assert!(
        store.get_rsvps("inv-4").await.unwrap().is_empty(),
        "Rejected submissions must not be stored"
    );
}

#[tokio::test]
async fn test_submit_rsvp_to_unknown_invitation_is_rejected() {
    let (store, data_dir) = create_test_env();

    let err = submit_rsvp(
        &store,
        data_dir.path(),
        "ghost",
        rsvp_request("Ana", "Yes", 1, 0),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(
        store.get_rsvps("ghost").await.unwrap().is_empty(),
        "No entry may be recorded against a missing invitation"
    );
}

#[tokio::test]
async fn test_list_rsvps_returns_entries_in_order() {
    let (store, _data_dir) = create_test_env();
    seed_invitation(&store, "inv-5").await;
    store.seed_rsvps(
        "inv-5",
        vec![
            RsvpEntry::new("Ana".into(), "".into(), "Yes".into(), 2, 0, "".into()),
            RsvpEntry::new("Ben".into(), "".into(), "No".into(), 1, 0, "".into()),
        ],
    )
    .await;

    let entries = list_rsvps(&store, "inv-5").await.unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Ben"]);
}

#[tokio::test]
async fn test_update_rsvp_matches_name_and_timestamp() {
    let (store, data_dir) = create_test_env();
    seed_invitation(&store, "inv-6").await;

    let mut first = RsvpEntry::new("Ana".into(), "".into(), "Yes".into(), 2, 1, "".into());
    first.timestamp = "2025-09-01T10:00:00Z".to_string();
    let mut second = RsvpEntry::new("Ana".into(), "".into(), "Maybe".into(), 1, 0, "".into());
    second.timestamp = "2025-09-02T11:00:00Z".to_string();
    store.seed_rsvps("inv-6", vec![first, second]).await;

    let updated = update_rsvp(
        &store,
        data_dir.path(),
        "inv-6",
        UpdateRsvpRequest {
            name: "Ana".to_string(),
            timestamp: "2025-09-02T11:00:00Z".to_string(),
            response: "Yes".to_string(),
            adults: 3,
            kids: 2,
        },
    )
    .await
    .unwrap();
    debug!("Updated entry: {:?}", updated);

    assert_eq!(updated.response, "Yes");
    assert_eq!(updated.total_guests, 5);
    assert!(updated.last_modified.is_some());

    let entries = store.get_rsvps("inv-6").await.unwrap();
    assert_eq!(entries.len(), 2, "Update must not add or drop entries");
    // Only the matching entry changed
    assert_eq!(entries[0].adults, 2);
    assert!(entries[0].last_modified.is_none());
    assert_eq!(entries[1].adults, 3);
    assert_eq!(entries[1].kids, 2);
}

#[tokio::test]
async fn test_update_rsvp_without_match_is_not_found() {
    let (store, data_dir) = create_test_env();
    seed_invitation(&store, "inv-7").await;
    store.seed_rsvps(
        "inv-7",
        vec![RsvpEntry::new(
            "Ana".into(),
            "".into(),
            "Yes".into(),
            1,
            0,
            "".into(),
        )],
    )
    .await;

    let err = update_rsvp(
        &store,
        data_dir.path(),
        "inv-7",
        UpdateRsvpRequest {
            name: "Ana".to_string(),
            timestamp: "1999-01-01T00:00:00Z".to_string(),
            response: "No".to_string(),
            adults: 1,
            kids: 0,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_clear_rsvps_empties_the_list() {
    let (store, _data_dir) = create_test_env();
    seed_invitation(&store, "inv-8").await;
    store.seed_rsvps(
        "inv-8",
        vec![
            RsvpEntry::new("Ana".into(), "".into(), "Yes".into(), 2, 0, "".into()),
            RsvpEntry::new("Ben".into(), "".into(), "No".into(), 1, 0, "".into()),
        ],
    )
    .await;

    clear_rsvps(&store, "inv-8").await.unwrap();

    assert!(store.get_rsvps("inv-8").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rsvp_summary_over_stored_entries() {
    let (store, _data_dir) = create_test_env();
    seed_invitation(&store, "inv-9").await;
    store.seed_rsvps(
        "inv-9",
        vec![
            RsvpEntry::new("Ana".into(), "".into(), "Yes".into(), 2, 1, "".into()),
            RsvpEntry::new("Ben".into(), "".into(), "no".into(), 1, 0, "".into()),
            RsvpEntry::new("Cal".into(), "".into(), "Maybe".into(), 4, 4, "".into()),
        ],
    )
    .await;

    let summary = rsvp_summary(&store, "inv-9").await.unwrap();

    assert_eq!(summary.total_responses, 3);
    assert_eq!(summary.yes_count, 1);
    assert_eq!(summary.no_count, 1);
    assert_eq!(summary.maybe_count, 1);
    assert_eq!(summary.total_guests, 3, "Totals cover confirmed guests only");
}

#[tokio::test]
async fn test_rsvp_summary_of_unknown_invitation_is_empty() {
    let (store, _data_dir) = create_test_env();

    let summary = rsvp_summary(&store, "ghost").await.unwrap();
    assert_eq!(summary.total_responses, 0);
}

#[tokio::test]
async fn test_export_rsvps_csv_shape() {
    let (store, _data_dir) = create_test_env();
    seed_invitation(&store, "inv-10").await;
    store.seed_rsvps(
        "inv-10",
        vec![RsvpEntry::new(
            "Ana".into(),
            "ana@example.com".into(),
            "Yes".into(),
            2,
            1,
            "See you there, all of us!".into(),
        )],
    )
    .await;

    let csv = export_rsvps_csv(&store, "inv-10").await.unwrap();
    let mut lines = csv.lines();

    assert_eq!(
        lines.next(),
        Some("name,email,response,adults,kids,total_guests,message,timestamp")
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("Ana,ana@example.com,Yes,2,1,3,"));
    assert!(
        row.contains("\"See you there, all of us!\""),
        "Comma-bearing message must be quoted"
    );
}

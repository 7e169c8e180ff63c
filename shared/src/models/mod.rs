use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tag recorded as the creator of newly written records
pub const CREATOR_TAG: &str = "fete-app";

/// Schema version stamped into record metadata
pub const SCHEMA_VERSION: &str = "1.0";

/// Returns the current UTC time as an RFC 3339 string
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}

/// Outcome of the best-effort backup pipeline for a record
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    Pending,
    Completed,
    Failed,
}

/// Write-safety bookkeeping stored alongside an invitation
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SafetyMetadata {
    pub created_at: String,
    pub created_by: String,
    pub version: String,
    pub backup_status: BackupStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_timestamp: Option<String>,
}

impl SafetyMetadata {
    /// Metadata for a record that has been written but not yet backed up
    pub fn pending() -> Self {
        SafetyMetadata {
            created_at: now_str(),
            created_by: CREATOR_TAG.to_string(),
            version: SCHEMA_VERSION.to_string(),
            backup_status: BackupStatus::Pending,
            backup_timestamp: None,
        }
    }

    /// Records the outcome of a completed backup attempt
    pub fn resolve(&mut self, status: BackupStatus) {
        self.backup_status = status;
        self.backup_timestamp = Some(now_str());
    }
}

/// One published event, keyed by an opaque identifier.
///
/// The identifier doubles as the public URL token and the storage key;
/// it lives in the file name, never inside the record body.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Invitation {
    #[serde(skip)]
    pub id: String,
    /// Open mapping of event attributes (name, hosts, venue, theme, media
    /// payloads and so on); only a small required set is validated upstream
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(
        rename = "_safety_metadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub safety_metadata: Option<SafetyMetadata>,
}

impl Invitation {
    /// Builds a new invitation with pending backup metadata
    pub fn new(id: String, fields: Map<String, Value>) -> Self {
        Invitation {
            id,
            fields,
            safety_metadata: Some(SafetyMetadata::pending()),
        }
    }

    /// String-valued event field, if present
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn event_name(&self) -> Option<&str> {
        self.field_str("event_name")
    }

    /// Address that receives new-RSVP alerts, if the host configured one
    pub fn manager_email(&self) -> Option<&str> {
        self.field_str("manager_email")
    }
}

/// Write-safety bookkeeping stamped on a single RSVP entry
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EntrySafetyMetadata {
    pub timestamp: String,
    pub backup_status: BackupStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_timestamp: Option<String>,
}

impl EntrySafetyMetadata {
    pub fn pending(timestamp: String) -> Self {
        EntrySafetyMetadata {
            timestamp,
            backup_status: BackupStatus::Pending,
            backup_timestamp: None,
        }
    }

    pub fn resolve(&mut self, status: BackupStatus) {
        self.backup_status = status;
        self.backup_timestamp = Some(now_str());
    }
}

/// One guest response within an invitation's RSVP list.
///
/// Every field tolerates being absent in stored data; counts additionally
/// tolerate non-numeric values by reading as zero, so one hand-edited entry
/// cannot make a whole list unreadable.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RsvpEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub response: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub adults: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub kids: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_guests: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(
        rename = "_last_modified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<String>,
    #[serde(
        rename = "_safety_metadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub safety_metadata: Option<EntrySafetyMetadata>,
}

impl RsvpEntry {
    /// Builds a new entry with a computed total and pending backup metadata
    pub fn new(
        name: String,
        email: String,
        response: String,
        adults: u32,
        kids: u32,
        message: String,
    ) -> Self {
        let timestamp = now_str();
        RsvpEntry {
            name,
            email,
            response,
            adults,
            kids,
            total_guests: adults + kids,
            message,
            timestamp: timestamp.clone(),
            last_modified: None,
            safety_metadata: Some(EntrySafetyMetadata::pending(timestamp)),
        }
    }

    /// True when the guest answered yes, in any capitalization
    pub fn is_attending(&self) -> bool {
        self.response.trim().eq_ignore_ascii_case("yes")
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v as u32)
            .or_else(|| n.as_f64().map(|v| v as u32))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    })
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use fete_shared::models::RsvpEntry;

/// Event fields every invitation must carry, checked non-blank on create
pub const REQUIRED_EVENT_FIELDS: [&str; 6] = [
    "event_name",
    "host_names",
    "event_date",
    "event_time",
    "venue_address",
    "invitation_message",
];

/// Required keys that are absent or blank in the given field mapping
pub fn missing_required_fields(fields: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_EVENT_FIELDS
        .iter()
        .filter(|key| !field_present(fields.get(**key)))
        .copied()
        .collect()
}

fn field_present(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(_)) => true,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Null) | None => false,
    }
}

// Request DTOs
#[derive(Deserialize, Debug)]
pub struct CreateInvitationRequest {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Deserialize, Debug)]
pub struct RsvpRequest {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub response: String,
    #[serde(default)]
    pub adults: u32,
    #[serde(default)]
    pub kids: u32,
    #[serde(default)]
    pub message: String,
}

impl RsvpRequest {
    /// Builds the stored entry: computed total, fresh timestamp, pending metadata
    pub fn into_entry(self) -> RsvpEntry {
        RsvpEntry::new(
            self.name,
            self.email,
            self.response,
            self.adults,
            self.kids,
            self.message,
        )
    }
}

/// Edit of one existing entry, matched by guest name and submission timestamp
#[derive(Deserialize, Debug)]
pub struct UpdateRsvpRequest {
    pub name: String,
    pub timestamp: String,
    pub response: String,
    pub adults: u32,
    pub kids: u32,
}

// Response DTOs
#[derive(Serialize, Debug)]
pub struct SubmitRsvpOutcome {
    pub entry: RsvpEntry,
    pub notification_sent: bool,
    pub notification_detail: String,
}

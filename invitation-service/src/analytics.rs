use serde::Serialize;

use fete_shared::models::RsvpEntry;

const CSV_COLUMNS: [&str; 8] = [
    "name",
    "email",
    "response",
    "adults",
    "kids",
    "total_guests",
    "message",
    "timestamp",
];

/// Fixed-shape aggregate over one invitation's RSVP list. Every field is
/// present even when the list is empty.
#[derive(Serialize, Debug, Default)]
pub struct RsvpSummary {
    pub total_responses: usize,
    pub yes_count: usize,
    pub no_count: usize,
    pub maybe_count: usize,
    pub total_adults: u32,
    pub total_children: u32,
    pub total_guests: u32,
    pub yes_list: Vec<RsvpEntry>,
    pub no_list: Vec<RsvpEntry>,
    pub maybe_list: Vec<RsvpEntry>,
}

/// Buckets entries by response and totals the guest counts over the yes
/// bucket only. Anything that is neither a yes nor a no counts as maybe.
pub fn summarize(entries: &[RsvpEntry]) -> RsvpSummary {
    let mut summary = RsvpSummary {
        total_responses: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        if entry.is_attending() {
            summary.yes_list.push(entry.clone());
        } else if entry.response.trim().eq_ignore_ascii_case("no") {
            summary.no_list.push(entry.clone());
        } else {
            summary.maybe_list.push(entry.clone());
        }
    }

    summary.yes_count = summary.yes_list.len();
    summary.no_count = summary.no_list.len();
    summary.maybe_count = summary.maybe_list.len();
    summary.total_adults = summary.yes_list.iter().map(|e| e.adults).sum();
    summary.total_children = summary.yes_list.iter().map(|e| e.kids).sum();
    summary.total_guests = summary.total_adults + summary.total_children;
    summary
}

/// Renders the raw entry list as CSV with a fixed column order. Fields
/// containing delimiters or quotes are quoted with doubled inner quotes.
pub fn to_csv(entries: &[RsvpEntry]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_COLUMNS.join(","));
    out.push_str("\r\n");

    for entry in entries {
        let row = [
            csv_field(&entry.name),
            csv_field(&entry.email),
            csv_field(&entry.response),
            entry.adults.to_string(),
            entry.kids.to_string(),
            entry.total_guests.to_string(),
            csv_field(&entry.message),
            csv_field(&entry.timestamp),
        ];
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') || raw.contains('\r') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

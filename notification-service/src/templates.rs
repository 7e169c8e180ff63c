use fete_shared::models::{Invitation, RsvpEntry};

/// Display form of an RFC 3339 timestamp: seconds precision, no zone noise
fn display_time(timestamp: &str) -> String {
    match timestamp.get(..19) {
        Some(prefix) => prefix.replace('T', " at "),
        None => timestamp.to_string(),
    }
}

fn response_color(response: &str) -> &'static str {
    match response.trim().to_ascii_lowercase().as_str() {
        "yes" => "#2e7d32",
        "no" => "#c62828",
        _ => "#f9a825",
    }
}

/// Plain-text and HTML bodies for the new-RSVP alert sent to the host
pub fn rsvp_alert_bodies(invitation: &Invitation, entry: &RsvpEntry) -> (String, String) {
    let event = invitation.event_name().unwrap_or("Your Event");
    let submitted = display_time(&entry.timestamp);

    let text = format!(
        "New RSVP for {}!\n\n\
         Name: {}\n\
         Email: {}\n\
         Response: {}\n\
         Adults: {}\n\
         Kids: {}\n\
         Total guests: {}\n\
         Message: {}\n\
         Submitted: {}\n",
        event,
        entry.name,
        entry.email,
        entry.response,
        entry.adults,
        entry.kids,
        entry.total_guests,
        entry.message,
        submitted
    );

    let html = format!(
        "<html><body style=\"font-family: sans-serif; color: #333;\">\
         <h2>New RSVP for {}!</h2>\
         <p style=\"font-size: 1.1em;\">\
         <strong>{}</strong> responded \
         <strong style=\"color: {};\">{}</strong></p>\
         <table cellpadding=\"4\">\
         <tr><td>Email</td><td>{}</td></tr>\
         <tr><td>Adults</td><td>{}</td></tr>\
         <tr><td>Kids</td><td>{}</td></tr>\
         <tr><td>Total guests</td><td>{}</td></tr>\
         <tr><td>Message</td><td>{}</td></tr>\
         <tr><td>Submitted</td><td>{}</td></tr>\
         </table></body></html>",
        event,
        entry.name,
        response_color(&entry.response),
        entry.response,
        entry.email,
        entry.adults,
        entry.kids,
        entry.total_guests,
        entry.message,
        submitted
    );

    (text, html)
}

/// Plain-text and HTML bodies for one guest's reminder message
pub fn reminder_bodies(event_name: &str, guest_name: &str, message: &str) -> (String, String) {
    let text = format!(
        "Hi {},\n\n{}\n\nLooking forward to seeing you at {}!\n",
        guest_name, message, event_name
    );

    let html = format!(
        "<html><body style=\"font-family: sans-serif; color: #333;\">\
         <p>Hi {},</p>\
         <p>{}</p>\
         <p>Looking forward to seeing you at <strong>{}</strong>!</p>\
         </body></html>",
        guest_name, message, event_name
    );

    (text, html)
}

/// Plain-text and HTML bodies for the configuration-test message
pub fn test_bodies() -> (String, String) {
    let text = "This is a test email.\n\n\
                If you are reading it, your SMTP settings are working.\n"
        .to_string();
    let html = "<html><body style=\"font-family: sans-serif; color: #333;\">\
                <p>This is a test email.</p>\
                <p>If you are reading it, your SMTP settings are working.</p>\
                </body></html>"
        .to_string();
    (text, html)
}

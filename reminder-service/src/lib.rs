use fete_shared::models::{Invitation, RsvpEntry};
use log::{error, info};
use notification_service::config::SmtpConfig;
use notification_service::errors::NotificationError;
use notification_service::{mailer, templates};

/// Guests eligible for a reminder: answered yes, in any capitalization,
/// and left a non-empty email. A guest with no address is skipped and
/// counted neither as sent nor as failed.
pub fn eligible_recipients(entries: &[RsvpEntry]) -> Vec<&RsvpEntry> {
    entries
        .iter()
        .filter(|entry| entry.is_attending() && !entry.email.trim().is_empty())
        .collect()
}

/// Aggregate outcome line for a finished broadcast
fn broadcast_report(sent: usize, failed: usize) -> String {
    if failed == 0 {
        format!("Successfully sent to {} guests", sent)
    } else {
        format!("Successfully sent to {} guests. Failed: {}", sent, failed)
    }
}

/// Emails every confirmed guest a host-written reminder.
///
/// One message per guest over a fresh connection; individual failures are
/// logged and collected while the broadcast continues. The result is the
/// aggregate report, or an error when nothing could be sent at all.
pub async fn send_reminders(
    invitation: &Invitation,
    entries: &[RsvpEntry],
    subject: &str,
    message: &str,
) -> Result<String, NotificationError> {
    let config = SmtpConfig::resolve();
    if config.credentials().is_none() {
        return Err(NotificationError::NotConfigured);
    }
    if config.endpoint().is_none() {
        return Err(NotificationError::IncompleteConfig);
    }

    let recipients = eligible_recipients(entries);
    if recipients.is_empty() {
        return Err(NotificationError::NoEligibleGuests);
    }

    info!(
        "Sending reminders for invitation {} to {} guests",
        invitation.id,
        recipients.len()
    );
    let event = invitation.event_name().unwrap_or("Your Event");
    let mut sent = 0usize;
    let mut failures: Vec<String> = Vec::new();
    for guest in recipients {
        let address = guest.email.trim();
        let (text, html) = templates::reminder_bodies(event, &guest.name, message);
        match mailer::send_email(&config, address, subject, text, html).await {
            Ok(()) => {
                info!("Reminder sent to {} <{}>", guest.name, address);
                sent += 1;
            }
            Err(e) => {
                error!(
                    "Failed to send reminder to {} <{}>: {}",
                    guest.name, address, e
                );
                failures.push(format!("{} ({}): {}", guest.name, address, e));
                // Continue with the remaining guests
            }
        }
    }

    if sent > 0 {
        Ok(broadcast_report(sent, failures.len()))
    } else {
        Err(NotificationError::AllSendsFailed(failures.join("; ")))
    }
}

pub mod config;
pub mod errors;
pub mod mailer;
pub mod templates;

use fete_shared::models::{Invitation, RsvpEntry};
use log::{info, warn};

use crate::config::SmtpConfig;
use crate::errors::NotificationError;

const TEST_EMAIL_SUBJECT: &str = "Fete RSVP - Test Email";

/// Emails the invitation's manager about a newly submitted RSVP.
///
/// Always non-fatal for the caller: the RSVP is persisted before this runs,
/// so every failure here becomes the outcome reason and nothing more. The
/// only alert recipient is the invitation's own `manager_email`; there is
/// no fallback address.
pub async fn send_rsvp_alert(
    invitation: &Invitation,
    entry: &RsvpEntry,
) -> Result<String, NotificationError> {
    let config = SmtpConfig::resolve();
    let recipient = invitation.manager_email().unwrap_or("").trim().to_string();

    // A malformed address is refused before any connection is attempted
    if !recipient.is_empty() && !mailer::is_valid_email(&recipient) {
        warn!("Refusing RSVP alert to malformed address {}", recipient);
        return Err(NotificationError::InvalidRecipient(recipient));
    }
    if config.credentials().is_none() {
        return Err(NotificationError::NotConfigured);
    }
    if recipient.is_empty() {
        return Err(NotificationError::NoRecipient);
    }

    let event = invitation.event_name().unwrap_or("Your Event");
    let subject = format!("{} - {} - {}", event, entry.name, entry.response);
    let (text, html) = templates::rsvp_alert_bodies(invitation, entry);
    mailer::send_email(&config, &recipient, &subject, text, html).await?;

    info!(
        "RSVP alert for invitation {} sent to {}",
        invitation.id, recipient
    );
    Ok("sent".to_string())
}

/// Sends a fixed test message so a host can verify SMTP settings
pub async fn send_test_email(recipient: &str) -> Result<String, NotificationError> {
    let config = SmtpConfig::resolve();
    let recipient = recipient.trim();

    if config.credentials().is_none() || recipient.is_empty() {
        return Err(NotificationError::TestPrerequisitesMissing);
    }
    if !mailer::is_valid_email(recipient) {
        return Err(NotificationError::InvalidRecipient(recipient.to_string()));
    }

    let (text, html) = templates::test_bodies();
    mailer::send_email(&config, recipient, TEST_EMAIL_SUBJECT, text, html).await?;

    info!("Test email sent to {}", recipient);
    Ok("Test email sent".to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use fete_shared::test_utils::test_logging::init_test_logging;
    use serde_json::json;
    use std::env;

    fn invitation_with(manager_email: Option<&str>) -> Invitation {
        let mut fields = json!({ "event_name": "Gala" }).as_object().unwrap().clone();
        if let Some(address) = manager_email {
            fields.insert("manager_email".to_string(), json!(address));
        }
        Invitation::new("inv-1".to_string(), fields)
    }

    fn sample_entry() -> RsvpEntry {
        RsvpEntry::new(
            "Sam".to_string(),
            "sam@example.com".to_string(),
            "Yes".to_string(),
            2,
            1,
            String::new(),
        )
    }

    fn set_unreachable_smtp() {
        env::set_var("SMTP_USER", "mailer@example.com");
        env::set_var("SMTP_PASS", "hunter2");
        env::set_var("SMTP_HOST", "127.0.0.1");
        env::set_var("SMTP_PORT", "1");
        env::set_var("SMTP_TLS", "false");
    }

    #[tokio::test]
    async fn test_alert_without_credentials_reports_not_configured() {
        init_test_logging();
        let _guard = test_env::lock();
        test_env::clear_smtp_env();
        env::set_var("SECRETS_FILE", "/nonexistent/secrets.toml");

        let result = send_rsvp_alert(&invitation_with(Some("host@example.com")), &sample_entry())
            .await;
        assert_eq!(result.unwrap_err().to_string(), "SMTP not configured");
        test_env::clear_smtp_env();
    }

    #[tokio::test]
    async fn test_alert_refuses_malformed_recipient_before_config_checks() {
        init_test_logging();
        let _guard = test_env::lock();
        test_env::clear_smtp_env();

        let result =
            send_rsvp_alert(&invitation_with(Some("not-an-address")), &sample_entry()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid email address: not-an-address"
        );
        test_env::clear_smtp_env();
    }

    #[tokio::test]
    async fn test_alert_without_manager_email_reports_no_recipient() {
        init_test_logging();
        let _guard = test_env::lock();
        test_env::clear_smtp_env();
        env::set_var("SMTP_USER", "mailer@example.com");
        env::set_var("SMTP_PASS", "hunter2");

        let result = send_rsvp_alert(&invitation_with(None), &sample_entry()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No recipient email configured"
        );
        test_env::clear_smtp_env();
    }

    #[tokio::test]
    async fn test_alert_without_endpoint_reports_incomplete_config() {
        init_test_logging();
        let _guard = test_env::lock();
        test_env::clear_smtp_env();
        env::set_var("SMTP_USER", "mailer@example.com");
        env::set_var("SMTP_PASS", "hunter2");

        let result =
            send_rsvp_alert(&invitation_with(Some("host@example.com")), &sample_entry()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "SMTP configuration incomplete - missing host or port"
        );
        test_env::clear_smtp_env();
    }

    #[tokio::test]
    async fn test_alert_transport_failure_is_reported_not_raised() {
        init_test_logging();
        let _guard = test_env::lock();
        test_env::clear_smtp_env();
        set_unreachable_smtp();

        let result =
            send_rsvp_alert(&invitation_with(Some("host@example.com")), &sample_entry()).await;
        let reason = result.unwrap_err().to_string();
        assert!(reason.starts_with("SMTP error:"), "reason: {}", reason);
        test_env::clear_smtp_env();
    }

    #[tokio::test]
    async fn test_test_email_requires_credentials_and_recipient() {
        init_test_logging();
        let _guard = test_env::lock();
        test_env::clear_smtp_env();
        env::set_var("SECRETS_FILE", "/nonexistent/secrets.toml");

        let result = send_test_email("host@example.com").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Missing SMTP_USER/SMTP_PASS or recipient"
        );

        env::set_var("SMTP_USER", "mailer@example.com");
        env::set_var("SMTP_PASS", "hunter2");
        let result = send_test_email("   ").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Missing SMTP_USER/SMTP_PASS or recipient"
        );
        test_env::clear_smtp_env();
    }

    #[tokio::test]
    async fn test_test_email_validates_recipient_shape() {
        init_test_logging();
        let _guard = test_env::lock();
        test_env::clear_smtp_env();
        env::set_var("SMTP_USER", "mailer@example.com");
        env::set_var("SMTP_PASS", "hunter2");

        let result = send_test_email("bad address").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid email address: bad address"
        );
        test_env::clear_smtp_env();
    }
}

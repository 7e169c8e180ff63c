use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{SmtpConfig, SMTP_TIMEOUT};
use crate::errors::NotificationError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});

/// Shape check applied to recipient addresses before any connection is made
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

/// Builds the blocking SMTP transport for one delivery
pub fn build_transport(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    use_tls: bool,
) -> Result<SmtpTransport, NotificationError> {
    let builder = if use_tls {
        SmtpTransport::starttls_relay(host).map_err(|e| NotificationError::Smtp(e.to_string()))?
    } else {
        SmtpTransport::builder_dangerous(host)
    };
    Ok(builder
        .port(port)
        .credentials(Credentials::new(user.to_string(), password.to_string()))
        .timeout(Some(SMTP_TIMEOUT))
        .build())
}

/// Builds a message carrying both a plain-text and an HTML body
pub fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    text_body: String,
    html_body: String,
) -> Result<Message, NotificationError> {
    let sender: Mailbox = from
        .parse()
        .map_err(|e| NotificationError::BuildFailed(format!("sender {}: {}", from, e)))?;
    let recipient: Mailbox = to
        .parse()
        .map_err(|e| NotificationError::BuildFailed(format!("recipient {}: {}", to, e)))?;

    Message::builder()
        .from(sender)
        .to(recipient)
        .subject(subject)
        .multipart(MultiPart::alternative_plain_html(text_body, html_body))
        .map_err(|e| NotificationError::BuildFailed(e.to_string()))
}

/// Hands the blocking send to a worker thread off the async runtime
pub async fn deliver(mailer: SmtpTransport, email: Message) -> Result<(), NotificationError> {
    tokio::task::spawn_blocking(move || mailer.send(&email))
        .await
        .map_err(|e| NotificationError::Smtp(format!("send task failed: {}", e)))?
        .map_err(|e| NotificationError::Smtp(e.to_string()))?;
    Ok(())
}

/// Connects, authenticates and sends one message over a fresh connection
pub async fn send_email(
    config: &SmtpConfig,
    to: &str,
    subject: &str,
    text_body: String,
    html_body: String,
) -> Result<(), NotificationError> {
    let (user, password) = config
        .credentials()
        .ok_or(NotificationError::NotConfigured)?;
    let (host, port) = config.endpoint().ok_or(NotificationError::IncompleteConfig)?;

    let mailer = build_transport(host, port, user, password, config.use_tls())?;
    let email = build_message(user, to, subject, text_body, html_body)?;
    debug!("Sending email to {} via {}:{}", to, host, port);
    deliver(mailer, email).await
}

use thiserror::Error;

/// Why an email could not be sent. The display string is the reason shown
/// to the host, so the wording here is part of the product surface.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("SMTP not configured")]
    NotConfigured,

    #[error("SMTP configuration incomplete - missing host or port")]
    IncompleteConfig,

    #[error("No recipient email configured")]
    NoRecipient,

    #[error("Invalid email address: {0}")]
    InvalidRecipient(String),

    #[error("Missing SMTP_USER/SMTP_PASS or recipient")]
    TestPrerequisitesMissing,

    #[error("No guests with 'Yes' responses found")]
    NoEligibleGuests,

    #[error("Failed to send to all guests: {0}")]
    AllSendsFailed(String),

    #[error("Failed to build email message: {0}")]
    BuildFailed(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

use thiserror::Error;

/// Errors surfaced by record store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid record id: {0}")]
    InvalidId(String),

    #[error("Failed to serialize record: {0}")]
    Serialization(String),
}

use fete_shared::error::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Handler-level error with the caller-facing message as its display form
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: String) -> Self {
        AppError::BadRequest(msg)
    }

    pub fn not_found(msg: String) -> Self {
        AppError::NotFound(msg)
    }

    pub fn unavailable(msg: String) -> Self {
        AppError::Unavailable(msg)
    }

    pub fn internal(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound(err.to_string()),
            StoreError::InvalidId(_) => AppError::BadRequest(err.to_string()),
            StoreError::StorageUnavailable(_) => AppError::Unavailable(err.to_string()),
            StoreError::Serialization(_) => AppError::Internal(err.to_string()),
        }
    }
}

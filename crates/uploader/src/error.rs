//! Upload error types.

use filedrop_transfer::Rejection;

use crate::types::SessionId;

/// Errors produced by the upload lifecycle.
///
/// None of these are fatal: every variant leaves the controller in a state
/// from which the user can select a file again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("file rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("transfer failed: {0}")]
    TransferFailure(String),

    /// An event arrived for a session that was reset or replaced.
    #[error("stale event for session {0}")]
    StaleCallback(SessionId),
}

/// Errors produced while loading or checking uploader options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("acceptedTypes must contain at least one MIME type")]
    NoAcceptedTypes,

    #[error("maxFileSizeMB must be a positive number, got {0}")]
    InvalidMaxFileSize(f64),

    #[error("uploaderURL must not be empty")]
    MissingEndpoint,
}

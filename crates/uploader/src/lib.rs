//! Single-file upload lifecycle.
//!
//! Validation, the upload state machine and its notifications, with no UI
//! or network code: hosts plug in an [`UploadTransport`] and render what
//! [`UploadController`] publishes.
//!
//! # Lifecycle
//!
//! 1. **Select**: the candidate is checked for type, then size
//! 2. **Upload**: an accepted file opens a session and starts a transfer
//! 3. **Settle**: 100 % progress or a success event ends in `Complete`,
//!    a transport failure in `Error`
//! 4. **Reset**: back to `Idle`; late events of the old session are dropped

pub mod config;
pub mod controller;
pub mod error;
pub mod transport;
pub mod types;

// Re-export primary types for convenience.
pub use config::{DisplayText, UploadConfiguration, UploaderOptions};
pub use controller::UploadController;
pub use error::{ConfigError, UploadError};
pub use filedrop_notify::{Notification, Severity};
pub use filedrop_transfer::{CandidateFile, FileSource, FileSummary, Rejection};
pub use transport::{TransferSender, TransferSubscription, UploadTransport};
pub use types::{
    Phase, SelectionOutcome, SessionId, TransferEvent, UploadSession, UploadState,
    WidgetCommand, WidgetSnapshot,
};

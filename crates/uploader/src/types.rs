//! Data types for the upload lifecycle.

use std::fmt;

use filedrop_notify::Notification;
use filedrop_transfer::{CandidateFile, FileSummary, Rejection};
use serde::Serialize;

use crate::error::UploadError;

/// Identity of an upload session. Never reused within one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event delivered by a transport for one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    /// Percentage of the body acknowledged so far (0–100).
    Progress(u8),
    /// The endpoint accepted the upload.
    Succeeded,
    /// The transfer failed; the detail is for logs, not for the user.
    Failed(String),
}

impl TransferEvent {
    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

/// An accepted file and its transfer progress.
#[derive(Debug, Clone)]
pub struct UploadSession {
    id: SessionId,
    file: CandidateFile,
    progress_percent: u8,
}

impl UploadSession {
    pub(crate) fn new(id: SessionId, file: CandidateFile) -> Self {
        Self {
            id,
            file,
            progress_percent: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn file(&self) -> &CandidateFile {
        &self.file
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    /// Raises progress to `percent` (clamped to 100). Returns `true` if it moved.
    pub(crate) fn advance_to(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if percent > self.progress_percent {
            self.progress_percent = percent;
            true
        } else {
            false
        }
    }
}

/// Lifecycle state. Each variant carries only the data valid for it.
#[derive(Debug, Clone, Default)]
pub enum UploadState {
    /// No file selected; the file picker is shown.
    #[default]
    Idle,
    /// A transfer is in flight.
    Uploading(UploadSession),
    /// The endpoint accepted the file (or progress reached 100 %).
    Complete(UploadSession),
    /// The transfer failed.
    Error {
        session: UploadSession,
        error: UploadError,
    },
}

impl UploadState {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Uploading(_) => Phase::Uploading,
            Self::Complete(_) => Phase::Complete,
            Self::Error { .. } => Phase::Error,
        }
    }

    /// The current session, if any.
    pub fn session(&self) -> Option<&UploadSession> {
        match self {
            Self::Idle => None,
            Self::Uploading(s) | Self::Complete(s) | Self::Error { session: s, .. } => Some(s),
        }
    }

    /// The file of the current session, if any.
    pub fn current_file(&self) -> Option<&CandidateFile> {
        self.session().map(UploadSession::file)
    }

    /// Progress of the current session; 0 when idle.
    pub fn progress_percent(&self) -> u8 {
        self.session().map_or(0, UploadSession::progress_percent)
    }

    /// `Complete` or `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Error { .. })
    }
}

/// Data-free view of [`UploadState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Uploading,
    Complete,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Result of handing a selection to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Nothing happened: the picker was dismissed or an upload is running.
    Ignored,
    /// The file failed validation; an error notification was shown.
    Rejected(Rejection),
    /// A new session started.
    Started(SessionId),
}

impl SelectionOutcome {
    /// Converts into a `Result`, mapping rejections to [`UploadError::Rejected`].
    pub fn into_result(self) -> Result<Option<SessionId>, UploadError> {
        match self {
            Self::Ignored => Ok(None),
            Self::Rejected(r) => Err(r.into()),
            Self::Started(id) => Ok(Some(id)),
        }
    }
}

/// Events a presentation layer sends to the controller.
#[derive(Debug, Clone)]
pub enum WidgetCommand {
    /// The user picked a file, or dismissed the picker (`None`).
    FileSelected(Option<CandidateFile>),
    /// The user closed the file card.
    ResetRequested,
}

/// Everything a presentation layer needs to render the widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSnapshot {
    pub phase: Phase,
    pub progress_percent: u8,
    pub current_file: Option<FileSummary>,
    pub notification: Option<Notification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> UploadSession {
        UploadSession::new(
            SessionId(7),
            CandidateFile::from_bytes("a.png", "image/png", vec![1u8; 10]),
        )
    }

    #[test]
    fn advance_is_monotonic_and_clamped() {
        let mut s = session();
        assert!(s.advance_to(40));
        assert!(!s.advance_to(20));
        assert_eq!(s.progress_percent(), 40);
        assert!(s.advance_to(250));
        assert_eq!(s.progress_percent(), 100);
        assert!(!s.advance_to(100));
    }

    #[test]
    fn idle_has_no_file_and_zero_progress() {
        let state = UploadState::Idle;
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.current_file().is_none());
        assert_eq!(state.progress_percent(), 0);
        assert!(!state.is_terminal());
    }

    #[test]
    fn error_state_exposes_session() {
        let mut s = session();
        s.advance_to(40);
        let state = UploadState::Error {
            session: s,
            error: UploadError::TransferFailure("boom".into()),
        };
        assert_eq!(state.phase(), Phase::Error);
        assert_eq!(state.progress_percent(), 40);
        assert_eq!(state.current_file().unwrap().name, "a.png");
        assert!(state.is_terminal());
    }

    #[test]
    fn terminal_events() {
        assert!(!TransferEvent::Progress(100).is_terminal());
        assert!(TransferEvent::Succeeded.is_terminal());
        assert!(TransferEvent::Failed("x".into()).is_terminal());
    }

    #[test]
    fn selection_outcome_into_result() {
        assert_eq!(SelectionOutcome::Ignored.into_result(), Ok(None));
        assert_eq!(
            SelectionOutcome::Started(SessionId(3)).into_result(),
            Ok(Some(SessionId(3)))
        );
        let rejected = SelectionOutcome::Rejected(Rejection::UnsupportedType {
            mime_type: "text/plain".into(),
        });
        assert!(matches!(
            rejected.into_result(),
            Err(UploadError::Rejected(Rejection::UnsupportedType { .. }))
        ));
    }

    #[test]
    fn phase_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Uploading).unwrap(), "\"uploading\"");
        assert_eq!(Phase::Complete.to_string(), "complete");
    }
}

//! Upload lifecycle controller.
//!
//! Owns the single active session, applies transfer events tagged with
//! their session id, and drives the notification channel. All mutation
//! goes through `&mut self`, so there is exactly one mutator; transport
//! events reach it through an internal inbox that the host drains with
//! [`process_next`](UploadController::process_next) or
//! [`run`](UploadController::run).

use std::sync::Arc;

use filedrop_notify::{Notification, NotificationChannel};
use filedrop_transfer::CandidateFile;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, trace, warn};

use crate::config::UploadConfiguration;
use crate::error::UploadError;
use crate::transport::{TransferSubscription, UploadTransport};
use crate::types::{
    SelectionOutcome, SessionId, TransferEvent, UploadSession, UploadState, WidgetCommand,
    WidgetSnapshot,
};

/// Notification text after a successful upload.
pub const SUCCESS_MESSAGE: &str = "File uploaded successfully!";

/// Notification text after a failed upload.
pub const FAILURE_MESSAGE: &str = "File upload failed. Please try again.";

/// Detail recorded when a transport ends a subscription without a result.
const CLOSED_WITHOUT_RESULT: &str = "transport closed without a result";

const INBOX_CAPACITY: usize = 256;

/// A transfer event tagged with the session it belongs to.
#[derive(Debug)]
struct SessionMessage {
    session: SessionId,
    event: TransferEvent,
}

/// The session whose events are currently of interest.
///
/// Dropping it cancels the event forwarder for that session.
struct ActiveTransfer {
    id: SessionId,
    _forwarder: DropGuard,
}

/// Drives one upload widget: validation, transfer, notifications, reset.
pub struct UploadController {
    config: Arc<UploadConfiguration>,
    transport: Arc<dyn UploadTransport>,
    state: UploadState,
    active: Option<ActiveTransfer>,
    next_session: u64,
    inbox_tx: mpsc::Sender<SessionMessage>,
    inbox_rx: mpsc::Receiver<SessionMessage>,
    notifications: NotificationChannel,
    state_tx: watch::Sender<UploadState>,
}

impl UploadController {
    /// Creates an idle controller.
    pub fn new(config: UploadConfiguration, transport: Arc<dyn UploadTransport>) -> Self {
        Self::with_notifications(config, transport, NotificationChannel::new())
    }

    /// Creates an idle controller with a preconfigured notification channel.
    pub fn with_notifications(
        config: UploadConfiguration,
        transport: Arc<dyn UploadTransport>,
        notifications: NotificationChannel,
    ) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let (state_tx, _) = watch::channel(UploadState::Idle);
        Self {
            config: Arc::new(config),
            transport,
            state: UploadState::Idle,
            active: None,
            next_session: 1,
            inbox_tx,
            inbox_rx,
            notifications,
            state_tx,
        }
    }

    pub fn config(&self) -> &UploadConfiguration {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Visible notification, if any.
    pub fn notification(&self) -> Option<Notification> {
        self.notifications.current()
    }

    /// Everything a presentation layer renders, in one value.
    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            phase: self.state.phase(),
            progress_percent: self.state.progress_percent(),
            current_file: self.state.current_file().map(CandidateFile::summary),
            notification: self.notifications.current(),
        }
    }

    /// Observes lifecycle state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<UploadState> {
        self.state_tx.subscribe()
    }

    /// Observes the visible notification.
    pub fn subscribe_notifications(&self) -> watch::Receiver<Option<Notification>> {
        self.notifications.subscribe()
    }

    /// Handles a file selection from the presentation layer.
    ///
    /// `None` (picker dismissed) is a no-op. While a transfer is running the
    /// selection is ignored. A rejected file only produces an error
    /// notification; an accepted one replaces any finished session and
    /// starts a transfer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn file_selected(&mut self, candidate: Option<CandidateFile>) -> SelectionOutcome {
        let Some(candidate) = candidate else {
            trace!("file picker dismissed");
            return SelectionOutcome::Ignored;
        };

        if let UploadState::Uploading(session) = &self.state {
            debug!(
                session = %session.id(),
                file = %candidate.name,
                "upload in progress, selection ignored"
            );
            return SelectionOutcome::Ignored;
        }

        if let Err(rejection) = self.config.validate(&candidate) {
            warn!(
                file = %candidate.name,
                mime = %candidate.mime_type,
                size = candidate.size_bytes,
                reason = %rejection,
                "file rejected"
            );
            let message = self.config.rejection_message(&rejection);
            self.notifications.error(message);
            return SelectionOutcome::Rejected(rejection);
        }

        // Any finished session is replaced by the new one.
        self.active = None;

        let id = SessionId(self.next_session);
        self.next_session += 1;

        info!(
            session = %id,
            file = %candidate.name,
            size = candidate.size_bytes,
            endpoint = %self.config.endpoint(),
            "upload started"
        );

        let subscription = self.transport.send(candidate.clone(), self.config.endpoint());
        let cancel = CancellationToken::new();
        tokio::spawn(forward_events(
            id,
            subscription,
            self.inbox_tx.clone(),
            cancel.clone(),
        ));
        self.active = Some(ActiveTransfer {
            id,
            _forwarder: cancel.drop_guard(),
        });

        self.set_state(UploadState::Uploading(UploadSession::new(id, candidate)));
        SelectionOutcome::Started(id)
    }

    /// Returns to `Idle`, discarding the current session.
    ///
    /// The transfer itself is not aborted; its remaining events are ignored.
    pub fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(session = %active.id, "session discarded");
        }
        if !matches!(self.state, UploadState::Idle) {
            info!(from = %self.state.phase(), "reset to idle");
            self.set_state(UploadState::Idle);
        }
    }

    /// Dispatches a presentation command.
    pub fn handle_command(&mut self, command: WidgetCommand) {
        match command {
            WidgetCommand::FileSelected(candidate) => {
                self.file_selected(candidate);
            }
            WidgetCommand::ResetRequested => self.reset(),
        }
    }

    /// Applies one transfer event.
    ///
    /// Returns [`UploadError::StaleCallback`] without touching any state if
    /// `session` is not the current session.
    pub fn handle_transfer_event(
        &mut self,
        session: SessionId,
        event: TransferEvent,
    ) -> Result<(), UploadError> {
        if self.active.as_ref().map(|a| a.id) != Some(session) {
            trace!(session = %session, ?event, "stale transfer event discarded");
            return Err(UploadError::StaleCallback(session));
        }

        let state = std::mem::take(&mut self.state);
        let (next, changed) = match (state, event) {
            (UploadState::Uploading(mut s), TransferEvent::Progress(percent)) => {
                let moved = s.advance_to(percent);
                if s.progress_percent() >= 100 {
                    (self.complete(s), true)
                } else {
                    if moved {
                        trace!(session = %session, progress = s.progress_percent(), "upload progress");
                    }
                    (UploadState::Uploading(s), moved)
                }
            }
            (UploadState::Uploading(s), TransferEvent::Succeeded) => (self.complete(s), true),
            // A failure wins even after progress reached 100 %.
            (
                UploadState::Uploading(s) | UploadState::Complete(s),
                TransferEvent::Failed(detail),
            ) => (self.fail(s, detail), true),
            (state @ UploadState::Complete(_), _) => (state, false),
            (state, event) => {
                trace!(session = %session, phase = %state.phase(), ?event, "event ignored in this phase");
                (state, false)
            }
        };

        self.state = next;
        if changed {
            self.state_tx.send_replace(self.state.clone());
        }
        Ok(())
    }

    /// Waits for the next transfer event and applies it.
    ///
    /// Stale events come back as [`UploadError::StaleCallback`]; hosts can
    /// ignore that error. Waits forever when no transfer is running.
    pub async fn process_next(&mut self) -> Result<(), UploadError> {
        match self.inbox_rx.recv().await {
            Some(msg) => self.handle_transfer_event(msg.session, msg.event),
            // The controller holds a sender itself, so the inbox never closes.
            None => std::future::pending().await,
        }
    }

    /// Applies transfer events until the current session leaves `Uploading`.
    pub async fn run_until_settled(&mut self) -> &UploadState {
        while matches!(self.state, UploadState::Uploading(_)) {
            if let Err(e) = self.process_next().await {
                trace!(error = %e, "event skipped");
            }
        }
        &self.state
    }

    /// Event loop: applies presentation commands and transfer events in
    /// arrival order until the command channel closes.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<WidgetCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(msg) = self.inbox_rx.recv() => {
                    if let Err(e) = self.handle_transfer_event(msg.session, msg.event) {
                        trace!(error = %e, "event skipped");
                    }
                }
            }
        }
        debug!("command channel closed, controller loop stopped");
    }

    fn complete(&mut self, mut session: UploadSession) -> UploadState {
        session.advance_to(100);
        info!(session = %session.id(), file = %session.file().name, "upload complete");
        self.notifications.success(SUCCESS_MESSAGE);
        UploadState::Complete(session)
    }

    fn fail(&mut self, session: UploadSession, detail: String) -> UploadState {
        warn!(
            session = %session.id(),
            file = %session.file().name,
            progress = session.progress_percent(),
            error = %detail,
            "upload failed"
        );
        self.notifications.error(FAILURE_MESSAGE);
        UploadState::Error {
            session,
            error: UploadError::TransferFailure(detail),
        }
    }

    fn set_state(&mut self, state: UploadState) {
        self.state = state;
        self.state_tx.send_replace(self.state.clone());
    }
}

/// Moves one session's events into the controller inbox until the
/// terminal event, the subscription closing, or cancellation.
async fn forward_events(
    session: SessionId,
    mut subscription: TransferSubscription,
    inbox: mpsc::Sender<SessionMessage>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                trace!(session = %session, "event forwarder cancelled");
                return;
            }
            event = subscription.next() => event,
        };

        let event = event.unwrap_or_else(|| {
            warn!(session = %session, "{CLOSED_WITHOUT_RESULT}");
            TransferEvent::Failed(CLOSED_WITHOUT_RESULT.into())
        });
        let terminal = event.is_terminal();

        if inbox.send(SessionMessage { session, event }).await.is_err() {
            return;
        }
        if terminal {
            return;
        }
    }
}

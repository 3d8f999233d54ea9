use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::trace;

/// How long a notification stays visible unless superseded.
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_millis(4000);

/// The visual category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        };
        f.write_str(s)
    }
}

/// A transient, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Monotonic per-channel id; only used to tell notifications apart.
    pub id: u64,
    pub severity: Severity,
    pub message: String,
}

/// Single-slot notification holder with auto-dismissal.
///
/// Observers read the slot through [`subscribe`](Self::subscribe). Each
/// `notify` spawns a dismiss task on the current Tokio runtime; the task is
/// owned through a [`DropGuard`], so replacing or dismissing the
/// notification (or dropping the channel) cancels it.
pub struct NotificationChannel {
    current: Arc<watch::Sender<Option<Notification>>>,
    timer: Option<DropGuard>,
    next_id: u64,
    dismiss_after: Duration,
}

impl NotificationChannel {
    /// Creates an empty channel with the default 4 s dismiss delay.
    pub fn new() -> Self {
        Self::with_dismiss_after(DEFAULT_DISMISS_AFTER)
    }

    /// Creates an empty channel with a custom dismiss delay.
    pub fn with_dismiss_after(dismiss_after: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            timer: None,
            next_id: 0,
            dismiss_after,
        }
    }

    /// Returns a receiver that observes the visible notification.
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.current.subscribe()
    }

    /// Returns the visible notification, if any.
    pub fn current(&self) -> Option<Notification> {
        self.current.borrow().clone()
    }

    /// Shows a notification, replacing whatever is visible.
    /// Returns the assigned id.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn notify(&mut self, severity: Severity, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        // Cancel the previous dismiss task before it can fire on the new message.
        self.timer = None;
        self.current.send_replace(Some(Notification {
            id,
            severity,
            message: message.into(),
        }));

        let cancel = CancellationToken::new();
        tokio::spawn(dismiss_later(
            Arc::clone(&self.current),
            id,
            self.dismiss_after,
            cancel.clone(),
        ));
        self.timer = Some(cancel.drop_guard());

        trace!(id, ?severity, "notification shown");
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.notify(Severity::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.notify(Severity::Success, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.notify(Severity::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.notify(Severity::Error, message)
    }

    /// Clears the visible notification. Returns `true` if one was visible.
    pub fn dismiss(&mut self) -> bool {
        self.timer = None;
        self.current.send_replace(None).is_some()
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

async fn dismiss_later(
    current: Arc<watch::Sender<Option<Notification>>>,
    id: u64,
    delay: Duration,
    cancel: CancellationToken,
) {
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep(delay) => {
            // Only clear the notification this task was started for.
            let cleared = current.send_if_modified(|slot| {
                if slot.as_ref().is_some_and(|n| n.id == id) {
                    *slot = None;
                    true
                } else {
                    false
                }
            });
            if cleared {
                trace!(id, "notification auto-dismissed");
            }
        }
    }
}

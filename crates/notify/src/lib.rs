//! Transient user-facing notifications.
//!
//! One notification is visible at a time. A new one supersedes the
//! current one immediately; each auto-dismisses after a fixed duration
//! unless it is replaced or dismissed first.

mod channel;

pub use channel::{DEFAULT_DISMISS_AFTER, Notification, NotificationChannel, Severity};

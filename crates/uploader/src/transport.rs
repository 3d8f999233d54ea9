//! Transport trait and per-transfer event subscription.
//!
//! `UploadTransport` is implemented by the host (or by `filedrop-http`) to
//! move the bytes.

use filedrop_transfer::CandidateFile;
use tokio::sync::mpsc;
use tracing::trace;

use crate::types::TransferEvent;

/// Capacity of a subscription: enough for every distinct percentage
/// plus the terminal event.
const SUBSCRIPTION_CAPACITY: usize = 128;

/// Abstract upload transport.
pub trait UploadTransport: Send + Sync {
    /// Starts sending `file` to `endpoint` and returns immediately.
    ///
    /// The subscription yields zero or more non-decreasing
    /// [`TransferEvent::Progress`] events followed by exactly one terminal
    /// event.
    fn send(&self, file: CandidateFile, endpoint: &str) -> TransferSubscription;
}

/// Receiving half of one transfer's events.
#[derive(Debug)]
pub struct TransferSubscription {
    rx: mpsc::Receiver<TransferEvent>,
}

impl TransferSubscription {
    /// Creates a connected sender/subscription pair.
    pub fn channel() -> (TransferSender, Self) {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        (TransferSender { tx }, Self { rx })
    }

    /// A subscription that reports `detail` as a failure and nothing else.
    ///
    /// For transports that can tell up front that a transfer cannot start.
    pub fn failed(detail: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 and a fresh channel: this cannot fail.
        let _ = tx.try_send(TransferEvent::Failed(detail.into()));
        Self { rx }
    }

    /// Waits for the next event. `None` once the transport dropped its sender.
    pub async fn next(&mut self) -> Option<TransferEvent> {
        self.rx.recv().await
    }
}

/// Sending half used by transports to report one transfer.
#[derive(Debug, Clone)]
pub struct TransferSender {
    tx: mpsc::Sender<TransferEvent>,
}

impl TransferSender {
    /// Reports progress without waiting.
    ///
    /// Returns `false` if the event was dropped because the subscriber is
    /// gone or lagging; a later progress or terminal event supersedes it.
    pub fn progress(&self, percent: u8) -> bool {
        match self.tx.try_send(TransferEvent::Progress(percent)) {
            Ok(()) => true,
            Err(e) => {
                trace!(percent, "progress event dropped: {e}");
                false
            }
        }
    }

    /// Reports success and ends the transfer.
    pub async fn succeed(self) {
        let _ = self.tx.send(TransferEvent::Succeeded).await;
    }

    /// Reports failure and ends the transfer.
    pub async fn fail(self, detail: impl Into<String>) {
        let _ = self.tx.send(TransferEvent::Failed(detail.into())).await;
    }

    /// Whether the subscriber has gone away (e.g. after a reset).
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (tx, mut sub) = TransferSubscription::channel();
        assert!(tx.progress(10));
        assert!(tx.progress(90));
        tx.succeed().await;

        assert_eq!(sub.next().await, Some(TransferEvent::Progress(10)));
        assert_eq!(sub.next().await, Some(TransferEvent::Progress(90)));
        assert_eq!(sub.next().await, Some(TransferEvent::Succeeded));
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn failed_subscription_yields_one_failure() {
        let mut sub = TransferSubscription::failed("bad url");
        assert_eq!(
            sub.next().await,
            Some(TransferEvent::Failed("bad url".into()))
        );
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn sender_sees_dropped_subscription() {
        let (tx, sub) = TransferSubscription::channel();
        assert!(!tx.is_closed());
        drop(sub);
        assert!(tx.is_closed());
        assert!(!tx.progress(50));
    }
}

/// Converts bytes sent into a whole percentage, rounded to nearest.
///
/// Halves round up. An empty body counts as fully sent.
pub fn percent_complete(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let sent = u128::from(sent.min(total));
    let total = u128::from(total);
    // floor(sent * 100 / total + 0.5) in integer arithmetic.
    ((sent * 200 + total) / (total * 2)) as u8
}

/// Accumulates bytes handed to the network and reports percentage changes.
///
/// The reported value never decreases and is only emitted when it differs
/// from the previously reported one, so a transport can forward every
/// `Some` straight to its subscriber.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    total: u64,
    sent: u64,
    last_reported: Option<u8>,
}

impl ProgressReporter {
    /// Creates a reporter for a body of `total` bytes.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            sent: 0,
            last_reported: None,
        }
    }

    /// Records `bytes` more sent. Returns the new percentage if it changed.
    pub fn advance(&mut self, bytes: u64) -> Option<u8> {
        self.sent = self.sent.saturating_add(bytes);
        let percent = self.percent();
        match self.last_reported {
            Some(last) if percent <= last => None,
            _ => {
                self.last_reported = Some(percent);
                Some(percent)
            }
        }
    }

    /// Bytes recorded so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Total body size.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Current percentage.
    pub fn percent(&self) -> u8 {
        percent_complete(self.sent, self.total)
    }
}

//! Candidate files, upload constraints and progress accounting.
//!
//! Everything in here is transport-agnostic: the controller uses the
//! validator before a transfer starts, transports use the progress
//! reporter while streaming a body.

mod progress;
mod types;
mod validation;

pub use progress::{ProgressReporter, percent_complete};
pub use types::{CandidateFile, FileSource, FileSummary};
pub use validation::{FileConstraints, Rejection, validate};

/// Body chunk size used when streaming a file: 64 KiB.
///
/// Small enough that progress moves smoothly for files near the
/// default 3 MB limit.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Bytes per megabyte as used by the size limit (binary megabytes).
pub const BYTES_PER_MB: u64 = 1024 * 1024;

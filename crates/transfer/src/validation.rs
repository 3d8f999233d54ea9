use crate::CandidateFile;

/// Constraints a candidate file must satisfy before a transfer starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConstraints {
    /// Accepted MIME types, matched by exact string equality.
    pub accepted_types: Vec<String>,
    /// Largest accepted file, inclusive.
    pub max_file_size_bytes: u64,
}

impl FileConstraints {
    /// Returns `true` if `mime_type` is one of the accepted types.
    pub fn accepts_type(&self, mime_type: &str) -> bool {
        self.accepted_types.iter().any(|t| t == mime_type)
    }
}

/// Why a candidate file was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("unsupported file type: {mime_type:?}")]
    UnsupportedType { mime_type: String },

    #[error("file too large: {size_bytes} bytes exceeds limit of {max_bytes} bytes")]
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

/// Validates a candidate file against upload constraints.
///
/// Rules run in order and stop at the first failure:
/// 1. MIME type must be in `accepted_types` (no wildcard or prefix matching)
/// 2. Size must not exceed `max_file_size_bytes`
pub fn validate(candidate: &CandidateFile, constraints: &FileConstraints) -> Result<(), Rejection> {
    if !constraints.accepts_type(&candidate.mime_type) {
        return Err(Rejection::UnsupportedType {
            mime_type: candidate.mime_type.clone(),
        });
    }

    if candidate.size_bytes > constraints.max_file_size_bytes {
        return Err(Rejection::TooLarge {
            size_bytes: candidate.size_bytes,
            max_bytes: constraints.max_file_size_bytes,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BYTES_PER_MB, FileSource};

    fn constraints(types: &[&str], max_mb: u64) -> FileConstraints {
        FileConstraints {
            accepted_types: types.iter().map(|t| t.to_string()).collect(),
            max_file_size_bytes: max_mb * BYTES_PER_MB,
        }
    }

    fn candidate(mime_type: &str, size_bytes: u64) -> CandidateFile {
        CandidateFile {
            name: "file".into(),
            mime_type: mime_type.into(),
            size_bytes,
            source: FileSource::Disk("/unused".into()),
        }
    }

    #[test]
    fn accepts_matching_type_within_limit() {
        let c = constraints(&["image/png"], 1);
        assert_eq!(validate(&candidate("image/png", 500_000), &c), Ok(()));
    }

    #[test]
    fn accepts_file_exactly_at_limit() {
        let c = constraints(&["image/png"], 1);
        assert_eq!(validate(&candidate("image/png", BYTES_PER_MB), &c), Ok(()));
    }

    #[test]
    fn rejects_one_byte_over_limit() {
        let c = constraints(&["image/png"], 1);
        assert_eq!(
            validate(&candidate("image/png", BYTES_PER_MB + 1), &c),
            Err(Rejection::TooLarge {
                size_bytes: BYTES_PER_MB + 1,
                max_bytes: BYTES_PER_MB,
            })
        );
    }

    #[test]
    fn rejects_unlisted_type() {
        let c = constraints(&["image/png"], 1);
        assert_eq!(
            validate(&candidate("application/pdf", 500_000), &c),
            Err(Rejection::UnsupportedType {
                mime_type: "application/pdf".into()
            })
        );
    }

    #[test]
    fn type_checked_before_size() {
        let c = constraints(&["image/png"], 1);
        let result = validate(&candidate("application/pdf", 50 * BYTES_PER_MB), &c);
        assert!(matches!(result, Err(Rejection::UnsupportedType { .. })));
    }

    #[test]
    fn four_megabytes_against_three_is_too_large() {
        let c = constraints(&["image/png", "image/jpeg", "image/gif", "application/pdf"], 3);
        let result = validate(&candidate("image/jpeg", 4 * BYTES_PER_MB), &c);
        assert!(matches!(result, Err(Rejection::TooLarge { .. })));
    }

    #[test]
    fn no_wildcard_matching() {
        let c = constraints(&["image/*"], 1);
        assert!(validate(&candidate("image/png", 10), &c).is_err());
    }

    #[test]
    fn no_prefix_or_case_folding() {
        let c = constraints(&["image/png"], 1);
        assert!(validate(&candidate("image/pn", 10), &c).is_err());
        assert!(validate(&candidate("IMAGE/PNG", 10), &c).is_err());
        assert!(validate(&candidate("", 10), &c).is_err());
    }

    #[test]
    fn empty_file_is_accepted() {
        let c = constraints(&["image/png"], 1);
        assert!(validate(&candidate("image/png", 0), &c).is_ok());
    }
}

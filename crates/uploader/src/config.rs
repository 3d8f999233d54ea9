//! Uploader configuration.
//!
//! [`UploaderOptions`] is what a host writes (JSON, camelCase keys);
//! [`UploadConfiguration`] is the checked, immutable form the controller
//! works with.

use std::path::Path;

use filedrop_transfer::{BYTES_PER_MB, CandidateFile, FileConstraints, Rejection};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// MIME types accepted when none are configured.
pub const DEFAULT_ACCEPTED_TYPES: &[&str] =
    &["image/png", "image/jpeg", "image/gif", "application/pdf"];

/// Size limit in megabytes when none is configured.
pub const DEFAULT_MAX_FILE_SIZE_MB: f64 = 3.0;

pub const DEFAULT_UPLOAD_MESSAGE: &str = "Click to upload";
pub const DEFAULT_ERROR_MESSAGE: &str = "Custom error message  - Failed";
pub const DEFAULT_UPLOADER_URL: &str = "http://localhost:5001/upload";
pub const DEFAULT_FILE_NAME: &str = "Name of the file to upload";

/// Host-supplied options. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploaderOptions {
    pub accepted_types: Vec<String>,
    #[serde(rename = "maxFileSizeMB")]
    pub max_file_size_mb: f64,
    pub upload_message: String,
    pub error_message: String,
    #[serde(rename = "uploaderURL")]
    pub uploader_url: String,
    pub default_file_name: String,
}

impl Default for UploaderOptions {
    fn default() -> Self {
        Self {
            accepted_types: DEFAULT_ACCEPTED_TYPES.iter().map(|t| t.to_string()).collect(),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            upload_message: DEFAULT_UPLOAD_MESSAGE.into(),
            error_message: DEFAULT_ERROR_MESSAGE.into(),
            uploader_url: DEFAULT_UPLOADER_URL.into(),
            default_file_name: DEFAULT_FILE_NAME.into(),
        }
    }
}

impl UploaderOptions {
    /// Parses options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), "uploader options loaded");
        Ok(options)
    }

    /// Checks the options and freezes them into a configuration.
    ///
    /// Empty type strings and duplicates are dropped (first occurrence
    /// wins, order kept).
    pub fn into_configuration(self) -> Result<UploadConfiguration, ConfigError> {
        let mut accepted_types: Vec<String> = Vec::with_capacity(self.accepted_types.len());
        for t in self.accepted_types {
            if !t.is_empty() && !accepted_types.contains(&t) {
                accepted_types.push(t);
            }
        }
        if accepted_types.is_empty() {
            return Err(ConfigError::NoAcceptedTypes);
        }

        let mb = self.max_file_size_mb;
        if !mb.is_finite() || mb <= 0.0 {
            return Err(ConfigError::InvalidMaxFileSize(mb));
        }
        // A candidate of integral size exceeds `mb` MiB exactly when it
        // exceeds the floor of the byte count.
        let max_file_size_bytes = (mb * BYTES_PER_MB as f64).floor() as u64;
        if max_file_size_bytes == 0 {
            return Err(ConfigError::InvalidMaxFileSize(mb));
        }

        let endpoint = self.uploader_url.trim().to_string();
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        Ok(UploadConfiguration {
            constraints: FileConstraints {
                accepted_types,
                max_file_size_bytes,
            },
            max_file_size_mb: mb,
            endpoint,
            display: DisplayText {
                upload_message: self.upload_message,
                error_message: self.error_message,
                default_file_name: self.default_file_name,
            },
        })
    }
}

/// Display-only strings carried through for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayText {
    /// Prompt shown on the empty widget.
    pub upload_message: String,
    /// Shown on the file card after a failed transfer.
    pub error_message: String,
    /// Placeholder shown where the file name will go.
    pub default_file_name: String,
}

/// Checked uploader configuration, immutable for the widget's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadConfiguration {
    constraints: FileConstraints,
    max_file_size_mb: f64,
    endpoint: String,
    display: DisplayText,
}

impl UploadConfiguration {
    pub fn accepted_types(&self) -> &[String] {
        &self.constraints.accepted_types
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.constraints.max_file_size_bytes
    }

    /// The limit as configured, for messages.
    pub fn max_file_size_mb(&self) -> f64 {
        self.max_file_size_mb
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn display(&self) -> &DisplayText {
        &self.display
    }

    pub fn constraints(&self) -> &FileConstraints {
        &self.constraints
    }

    /// Runs the validator against this configuration.
    pub fn validate(&self, candidate: &CandidateFile) -> Result<(), Rejection> {
        filedrop_transfer::validate(candidate, &self.constraints)
    }

    /// User-facing text for a rejection.
    pub fn rejection_message(&self, rejection: &Rejection) -> String {
        match rejection {
            Rejection::UnsupportedType { .. } => "Invalid file type.".to_string(),
            Rejection::TooLarge { .. } => format!(
                "File size exceeds the limit of {}MB.",
                self.max_file_size_mb
            ),
        }
    }

    /// Upper-cased subtypes of the accepted MIME types (`image/png` → `PNG`).
    pub fn accepted_extensions(&self) -> Vec<String> {
        self.accepted_types()
            .iter()
            .map(|t| {
                let subtype = t.split_once('/').map_or(t.as_str(), |(_, sub)| sub);
                subtype.to_uppercase()
            })
            .collect()
    }

    /// Hint such as `"PNG, JPEG, GIF or PDF (max: 3MB)"`.
    pub fn accept_hint(&self) -> String {
        let exts = self.accepted_extensions();
        let list = match exts.split_last() {
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
            None => String::new(),
        };
        format!("{list} (max: {}MB)", self.max_file_size_mb)
    }

    /// Comma-joined MIME list for a file picker filter.
    pub fn accept_attribute(&self) -> String {
        self.accepted_types().join(",")
    }
}

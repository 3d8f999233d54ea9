use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

/// Where the contents of a candidate file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Contents already held in memory (drag-and-drop, clipboard, tests).
    Memory(Arc<[u8]>),
    /// Contents read from disk when the transfer starts.
    Disk(PathBuf),
}

/// A file chosen by the user, before it is accepted or rejected.
///
/// `mime_type` and `size_bytes` are the *declared* attributes the
/// validator checks; transports read the bytes from `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub source: FileSource,
}

impl CandidateFile {
    /// Builds a candidate from in-memory contents. The size is taken from `data`.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: data.len() as u64,
            source: FileSource::Memory(data),
        }
    }

    /// Builds a candidate from a file on disk.
    ///
    /// The MIME type is guessed from the extension, falling back to
    /// `application/octet-stream`, the same way a browser file picker
    /// fills in `File.type`.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            name,
            mime_type,
            size_bytes: metadata.len(),
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    /// Returns the display-facing attributes of this file.
    pub fn summary(&self) -> FileSummary {
        FileSummary {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.size_bytes,
        }
    }
}

/// Display-facing view of a file, without its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl FileSummary {
    /// Size in kilobytes with two decimals, e.g. `"2000.00kb"`.
    pub fn size_label(&self) -> String {
        format!("{:.2}kb", self.size_bytes as f64 / 1024.0)
    }
}

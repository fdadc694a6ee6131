//! File payload abstraction.
//!
//! The file pipeline works on named byte payloads. The presentation layer
//! hands over uploaded bytes with their original filenames; payloads can
//! also be loaded from disk for offline use.

use crate::core::error::AnalysisError;

use std::path::Path;

/// A named byte payload submitted for scanning.
///
/// # Examples
///
/// ```rust
/// use vetkit::core::FilePayload;
///
/// let payload = FilePayload::new("invoice.pdf.exe", vec![0x4D, 0x5A]);
/// assert_eq!(payload.extension(), "exe");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FilePayload {
    filename: String,
    data: Vec<u8>,
}

impl std::fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePayload")
            .field("filename", &self.filename)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FilePayload {
    /// Creates a payload from a filename and bytes.
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Loads a payload from a file on disk.
    ///
    /// The payload filename is the final path component.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = std::fs::read(path)?;
        Ok(Self { filename, data })
    }

    /// The original filename, including any archive-internal path.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload has no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The declared terminal extension, lowercased, without the dot.
    ///
    /// Returns an empty string when the filename has no extension.
    pub fn extension(&self) -> String {
        extension_of(&self.filename)
    }
}

/// Extracts the lowercased terminal extension from a filename.
///
/// Path separators are honored so archive entry paths like
/// `dir/evil.exe` resolve to `exe`.
pub fn extension_of(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    match basename.rfind('.') {
        Some(idx) if idx + 1 < basename.len() => basename[idx + 1..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

//! Scoped local staging for blobs between download and upload.
//!
//! A [`StagedFile`] owns a named temporary file that is deleted when the
//! value is dropped, so every exit path of an item (success, `?`, or an
//! early `return`) releases it before the next item starts.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// A temporary file holding one item's binary content.
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    /// Create an empty staging file with the given suffix (e.g. `".pdf"`).
    pub fn new(suffix: &str) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("rvw-stage-")
            .suffix(suffix)
            .tempfile()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

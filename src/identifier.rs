//! File identifier extraction from share links.
//!
//! Recognizes the three link shapes the source store hands out:
//!
//! | Shape | Example |
//! |-------|---------|
//! | path segment | `https://drive.google.com/file/d/<ID>/view` |
//! | `open?id=` | `https://drive.google.com/open?id=<ID>` |
//! | `uc?id=` | `https://drive.google.com/uc?id=<ID>&export=download` |
//!
//! Matching is unanchored: the first recognized shape anywhere in the string
//! wins. No case folding or trimming is applied to the captured identifier.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::FileId;

static FILE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:file/d/|open\?id=|uc\?id=)([a-zA-Z0-9_-]+)")
        .expect("file id pattern is valid")
});

/// Extract the source-store identifier from a reference string.
///
/// Returns `None` when no recognized shape is present; callers treat that as
/// a skip, not an error.
pub fn extract_file_id(reference: &str) -> Option<FileId> {
    FILE_ID_PATTERN
        .captures(reference)
        .and_then(|caps| caps.get(1))
        .map(|m| FileId::new(m.as_str()))
}

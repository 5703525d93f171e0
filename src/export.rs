//! Reading reference lists and persisting analysis results.
//!
//! Results are written as a pretty-printed JSON array of objects with the
//! fields `file_name`, `file_id`, `student_name`, `analysis`, in that order.
//! Downstream rendering reads this file back.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::models::AnalysisResult;

/// Load references from a text file, one per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn load_references(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read links file: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Write results to `path` as indented JSON.
pub fn write_results(path: &Path, results: &[AnalysisResult]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    results.serialize(&mut ser)?;

    std::fs::write(path, &buf)
        .with_context(|| format!("Could not write to {}", path.display()))?;
    tracing::info!(count = results.len(), path = %path.display(), "saved responses");
    Ok(())
}

/// Read results previously written by [`write_results`].
pub fn read_results(path: &Path) -> Result<Vec<AnalysisResult>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid results file: {}", path.display()))
}

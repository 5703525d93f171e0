//! Name roster: first name, last name, and link per reference.
//!
//! Unlike ingestion, a reference that cannot be resolved still produces a
//! row, marked as failed with the reason, so the roster lines up one-to-one
//! with the input list (minus blank entries).

use crate::identifier::extract_file_id;
use crate::models::RosterRow;
use crate::names::{resolve_name, split_name};
use crate::traits::SourceStore;

pub const HEADER: [&str; 3] = ["First Name", "Last Name", "Link"];

/// Build one roster row per non-empty reference.
pub async fn build_roster(source: &dyn SourceStore, references: &[String]) -> Vec<RosterRow> {
    let mut rows = Vec::with_capacity(references.len());

    for reference in references {
        if reference.is_empty() {
            continue;
        }
        let link = reference.clone();

        let Some(file_id) = extract_file_id(reference) else {
            rows.push(RosterRow::Failed {
                reason: "Invalid link",
                link,
            });
            continue;
        };

        let metadata = match source.metadata(&file_id).await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "error processing link");
                rows.push(RosterRow::Failed {
                    reason: "API error",
                    link,
                });
                continue;
            }
        };

        let resolved = metadata
            .name
            .as_deref()
            .and_then(|name| resolve_name(name).ok());

        match resolved {
            Some(name) => {
                let (first_name, last_name) = split_name(&name);
                tracing::info!(first = %first_name, last = %last_name, "processed");
                rows.push(RosterRow::Named {
                    first_name,
                    last_name,
                    link,
                });
            }
            None => rows.push(RosterRow::Failed {
                reason: "Could not parse name",
                link,
            }),
        }
    }

    rows
}

/// Render rows as tab-separated lines, header first.
pub fn to_tsv(rows: &[RosterRow]) -> String {
    let mut out = HEADER.join("\t");
    out.push('\n');
    for row in rows {
        out.push_str(&row.cells().join("\t"));
        out.push('\n');
    }
    out
}

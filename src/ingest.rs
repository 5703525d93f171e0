//! Ingestion pipeline.
//!
//! Turns a list of raw references into [`FileRecord`]s:
//!
//! ```text
//! reference ─▶ file id ─▶ metadata ─▶ resolved name ─▶ catalog lookup
//!                                                        │ hit: reuse handle
//!                                                        │ miss: stage ─▶ upload
//!                                                        ▼
//!                                                    FileRecord
//! ```
//!
//! References are processed one at a time. A failing reference is logged and
//! skipped; it never stops the batch and never produces a partial record.

use anyhow::{Context, Result};

use crate::catalog::CatalogIndex;
use crate::config::Pacing;
use crate::identifier::extract_file_id;
use crate::models::{FileId, FileRecord, RemoteBlobHandle, STAGED_CONTENT_TYPE, UNKNOWN_STUDENT};
use crate::names::resolve_name;
use crate::staging::StagedFile;
use crate::traits::{RemoteStore, SourceStore};

/// Ingest every reference, returning records for the ones that succeeded,
/// in input order.
pub async fn ingest_references(
    source: &dyn SourceStore,
    remote: &dyn RemoteStore,
    catalog: &CatalogIndex,
    references: &[String],
    pacing: &Pacing,
) -> Vec<FileRecord> {
    if references.is_empty() {
        tracing::info!("no files to process");
        return Vec::new();
    }

    let mut records = Vec::with_capacity(references.len());

    for reference in references {
        let Some(file_id) = extract_file_id(reference) else {
            tracing::warn!(reference = %reference, "could not find file id in link, skipped");
            continue;
        };

        let metadata = match source.metadata(&file_id).await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(
                    reference = %reference,
                    file_id = %file_id,
                    error = %e,
                    "failed to fetch metadata, skipped"
                );
                continue;
            }
        };

        let file_name = match metadata.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                tracing::warn!(file_id = %file_id, "file has no name, skipped");
                continue;
            }
        };

        let resolved_name = match resolve_name(&file_name) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(file_name = %file_name, error = %e, "using placeholder name");
                UNKNOWN_STUDENT.to_string()
            }
        };

        let remote_handle = match catalog.lookup(&file_name) {
            Some(existing) => {
                tracing::info!(file_name = %file_name, "already in remote store, using existing");
                existing.clone()
            }
            None => match stage_and_upload(source, remote, &file_id, &file_name).await {
                Ok(uploaded) => {
                    tokio::time::sleep(pacing.upload_delay).await;
                    uploaded
                }
                Err(e) => {
                    tracing::warn!(
                        file_name = %file_name,
                        file_id = %file_id,
                        error = %format!("{:#}", e),
                        "failed to process file, skipped"
                    );
                    continue;
                }
            },
        };

        records.push(FileRecord {
            identifier: file_id,
            display_name: file_name,
            resolved_name,
            remote: remote_handle,
        });
    }

    tracing::info!(
        ingested = records.len(),
        total = references.len(),
        "ingestion finished"
    );
    records
}

/// Download into a scoped staging file and upload it.
///
/// The staging file is removed when this function returns, on success or
/// error.
async fn stage_and_upload(
    source: &dyn SourceStore,
    remote: &dyn RemoteStore,
    file_id: &FileId,
    file_name: &str,
) -> Result<RemoteBlobHandle> {
    tracing::info!(file_name = %file_name, "processing");
    let staged = StagedFile::new(".pdf").context("failed to create staging file")?;

    let bytes = source
        .download(file_id, staged.path())
        .await
        .with_context(|| format!("download of {} failed", file_id))?;
    tracing::info!(file_name = %file_name, bytes, "downloaded, uploading");

    let handle = remote
        .upload(staged.path(), file_name, STAGED_CONTENT_TYPE)
        .await
        .with_context(|| format!("upload of '{}' failed", file_name))?;
    tracing::info!(file_name = %file_name, uri = %handle.uri, "upload complete");

    Ok(handle)
}

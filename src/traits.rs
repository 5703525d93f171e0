//! Collaborator seams for the ingestion and analysis pipeline.
//!
//! The pipeline never talks to a network API directly. It is written against
//! three traits, each describing one external capability:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │ SourceStore  │   │ RemoteStore  │   │ AnalysisService │
//! │ metadata     │   │ list         │   │ generate        │
//! │ download     │   │ upload       │   │                 │
//! └──────┬───────┘   └──────┬───────┘   └────────┬────────┘
//!        └────────┬─────────┘                    │
//!                 ▼                              ▼
//!        ingest_references()            analyze_records()
//! ```
//!
//! Built-in implementations live in [`crate::drive`] (source store) and
//! [`crate::gemini`] (remote store and analysis service). Tests substitute
//! in-memory fakes.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use review_harness::error::SourceError;
//! use review_harness::models::{FileId, FileMetadata};
//! use review_harness::traits::SourceStore;
//! use std::path::Path;
//!
//! struct LocalDir(std::path::PathBuf);
//!
//! #[async_trait]
//! impl SourceStore for LocalDir {
//!     async fn metadata(&self, id: &FileId) -> Result<FileMetadata, SourceError> {
//!         Ok(FileMetadata { name: Some(format!("{}.pdf", id)) })
//!     }
//!
//!     async fn download(&self, id: &FileId, dest: &Path) -> Result<u64, SourceError> {
//!         let src = self.0.join(format!("{}.pdf", id));
//!         Ok(tokio::fs::copy(src, dest).await?)
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::path::Path;

use crate::error::{AnalysisError, SourceError, StoreError};
use crate::models::{FileId, FileMetadata, RemoteBlobHandle};

/// The store documents are referenced from (e.g. a shared drive).
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Fetch file metadata. Only the display name is used.
    async fn metadata(&self, id: &FileId) -> Result<FileMetadata, SourceError>;

    /// Write the file's full binary content to `dest`, returning the number
    /// of bytes written.
    async fn download(&self, id: &FileId, dest: &Path) -> Result<u64, SourceError>;
}

/// The remote store the analysis service reads blobs from.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List every blob currently stored, across all pages.
    async fn list(&self) -> Result<Vec<RemoteBlobHandle>, StoreError>;

    /// Upload the file at `path` under `display_name`.
    async fn upload(
        &self,
        path: &Path,
        display_name: &str,
        content_type: &str,
    ) -> Result<RemoteBlobHandle, StoreError>;
}

/// A generative text service that reads a prompt plus a stored blob.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Run `prompt` against `blob`. An empty string is a valid response.
    async fn generate(
        &self,
        prompt: &str,
        blob: &RemoteBlobHandle,
    ) -> Result<String, AnalysisError>;
}

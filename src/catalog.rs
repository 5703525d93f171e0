//! Snapshot index of blobs already present in the remote store.
//!
//! Built once per run and passed explicitly to the ingestion pipeline. A
//! listing failure degrades to an empty index, so the pipeline uploads
//! everything rather than skipping everything.

use std::collections::HashMap;

use crate::models::RemoteBlobHandle;
use crate::traits::RemoteStore;

/// Display name → remote handle.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: HashMap<String, RemoteBlobHandle>,
}

impl CatalogIndex {
    /// An index with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// List the remote store and index the result by display name.
    ///
    /// Never fails: on any listing error the index is empty.
    pub async fn build(store: &dyn RemoteStore) -> Self {
        tracing::info!("listing existing files in remote store");
        match store.list().await {
            Ok(handles) => {
                let index = Self::from_handles(handles);
                tracing::info!(count = index.len(), "found files already in remote store");
                index
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not list remote files, will upload all");
                Self::empty()
            }
        }
    }

    /// Index the given handles. Later duplicates replace earlier ones.
    pub fn from_handles(handles: impl IntoIterator<Item = RemoteBlobHandle>) -> Self {
        let entries = handles
            .into_iter()
            .map(|h| (h.display_name.clone(), h))
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, display_name: &str) -> Option<&RemoteBlobHandle> {
        self.entries.get(display_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by display name.
    pub fn iter_sorted(&self) -> Vec<(&str, &RemoteBlobHandle)> {
        let mut v: Vec<_> = self
            .entries
            .iter()
            .map(|(k, h)| (k.as_str(), h))
            .collect();
        v.sort_by(|a, b| a.0.cmp(b.0));
        v
    }
}

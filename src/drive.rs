//! Google Drive source store.
//!
//! Implements [`SourceStore`] over the Drive v3 REST API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | metadata | `GET {base}/files/{id}?fields=name` |
//! | download | `GET {base}/files/{id}?alt=media` |
//!
//! # Environment Variables
//!
//! A pre-issued OAuth access token is read from the variable named by
//! `source.token_env` (default `GOOGLE_ACCESS_TOKEN`). Token acquisition and
//! refresh happen outside this tool.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::models::{FileId, FileMetadata};
use crate::traits::SourceStore;

pub struct DriveClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl DriveClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token variable is not set or the HTTP
    /// client cannot be built.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .with_context(|| format!("{} environment variable not set", config.token_env))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn get_file(
        &self,
        id: &FileId,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, SourceError> {
        let url = format!("{}/files/{}", self.base_url, id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("supportsAllDrives", "true")])
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("GET {} failed: {}", url, e)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), id, &body))
    }
}

#[async_trait]
impl SourceStore for DriveClient {
    async fn metadata(&self, id: &FileId) -> Result<FileMetadata, SourceError> {
        let resp = self.get_file(id, &[("fields", "name")]).await?;
        resp.json::<FileMetadata>()
            .await
            .map_err(|e| {
                SourceError::Transport(format!("invalid metadata response for {}: {}", id, e))
            })
    }

    async fn download(&self, id: &FileId, dest: &Path) -> Result<u64, SourceError> {
        let mut resp = self.get_file(id, &[("alt", "media")]).await?;
        let total = resp.content_length();

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;

        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| SourceError::Transport(format!("download of {} interrupted: {}", id, e)))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if let Some(total) = total.filter(|t| *t > 0) {
                tracing::debug!(file_id = %id, percent = written * 100 / total, "downloading");
            }
        }

        file.flush().await?;
        Ok(written)
    }
}

fn status_error(status: u16, id: &FileId, body: &str) -> SourceError {
    match status {
        404 => SourceError::NotFound(id.to_string()),
        _ => SourceError::Transport(format!(
            "Drive API error (HTTP {}) for {}: {}",
            status,
            id,
            body.chars().take(500).collect::<String>()
        )),
    }
}

//! Gemini file store and content generation.
//!
//! [`GeminiClient`] implements both [`RemoteStore`] (the Files API) and
//! [`AnalysisService`] (`generateContent`):
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list | `GET {base}/v1beta/files?pageSize=100&pageToken=…` |
//! | upload | `POST {base}/upload/v1beta/files` (resumable: start, then upload+finalize) |
//! | generate | `POST {base}/v1beta/models/{model}:generateContent` |
//!
//! # Environment Variables
//!
//! The API key is read from the variable named by `gemini.api_key_env`
//! (default `GEMINI_API_KEY`).
//!
//! # Error Mapping
//!
//! - HTTP 429 → [`StoreError::QuotaExceeded`] / [`AnalysisError::RateLimited`]
//! - other non-success → [`StoreError::Transport`] / [`AnalysisError::Service`]
//! - network failure → `Transport`
//!
//! Calls are not retried here; pacing and backoff belong to the batch
//! operations.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{AnalysisError, StoreError};
use crate::models::{RemoteBlobHandle, STAGED_CONTENT_TYPE};
use crate::traits::{AnalysisService, RemoteStore};

const PAGE_SIZE: &str = "100";

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key variable is not set or the HTTP
    /// client cannot be built.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("{} environment variable not set", config.api_key_env))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model_path(&config.model),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn list_page(&self, token: Option<&str>) -> Result<ListFilesPage, StoreError> {
        let url = format!("{}/v1beta/files", self.base_url);
        let mut req = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .query(&[("pageSize", PAGE_SIZE)]);
        if let Some(token) = token {
            req = req.query(&[("pageToken", token)]);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("failed to list files: {}", e)))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(store_status_error(status.as_u16(), &body));
        }
        parse_list_page(&body)
    }
}

/// Normalize a model name to its resource path (`models/<name>`).
fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

#[async_trait]
impl RemoteStore for GeminiClient {
    async fn list(&self) -> Result<Vec<RemoteBlobHandle>, StoreError> {
        let mut handles = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.list_page(token.as_deref()).await?;
            handles.extend(page.files);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(handles)
    }

    async fn upload(
        &self,
        path: &Path,
        display_name: &str,
        content_type: &str,
    ) -> Result<RemoteBlobHandle, StoreError> {
        let bytes = tokio::fs::read(path).await?;

        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", content_type)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("upload start failed: {}", e)))?;

        let status = start.status();
        if !status.is_success() {
            let body = start.text().await.unwrap_or_default();
            return Err(store_status_error(status.as_u16(), &body));
        }
        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| StoreError::Malformed("missing x-goog-upload-url header".to_string()))?;

        let finish = self
            .client
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                StoreError::Transport(format!("upload of '{}' failed: {}", display_name, e))
            })?;

        let status = finish.status();
        let body = finish
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(store_status_error(status.as_u16(), &body));
        }
        parse_upload_response(&body)
    }
}

#[async_trait]
impl AnalysisService for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        blob: &RemoteBlobHandle,
    ) -> Result<String, AnalysisError> {
        let url = format!("{}/v1beta/{}:generateContent", self.base_url, self.model);
        let body = generate_request(prompt, blob);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(analysis_status_error(status.as_u16(), &text));
        }

        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| AnalysisError::Malformed(e.to_string()))?;
        Ok(response_text(&json))
    }
}

// ============ Wire Formats ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFilesPage {
    #[serde(default)]
    files: Vec<RemoteBlobHandle>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteBlobHandle,
}

fn parse_list_page(body: &str) -> Result<ListFilesPage, StoreError> {
    serde_json::from_str(body)
        .map_err(|e| StoreError::Malformed(format!("invalid file listing: {}", e)))
}

fn parse_upload_response(body: &str) -> Result<RemoteBlobHandle, StoreError> {
    serde_json::from_str::<UploadResponse>(body)
        .map(|r| r.file)
        .map_err(|e| StoreError::Malformed(format!("invalid upload response: {}", e)))
}

fn generate_request(prompt: &str, blob: &RemoteBlobHandle) -> serde_json::Value {
    let mime_type = blob.mime_type.as_deref().unwrap_or(STAGED_CONTENT_TYPE);
    serde_json::json!({
        "contents": [{
            "parts": [
                { "text": prompt },
                { "file_data": { "file_uri": blob.uri, "mime_type": mime_type } }
            ]
        }]
    })
}

/// Concatenate the text parts of the first candidate.
///
/// Returns an empty string when the response carries no text (e.g. a
/// blocked prompt); callers substitute their own placeholder.
fn response_text(json: &serde_json::Value) -> String {
    json.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(500).collect())
}

fn store_status_error(status: u16, body: &str) -> StoreError {
    let message = error_message(body);
    if status == 429 {
        StoreError::QuotaExceeded(message)
    } else {
        StoreError::Transport(format!("HTTP {}: {}", status, message))
    }
}

fn analysis_status_error(status: u16, body: &str) -> AnalysisError {
    let message = error_message(body);
    if status == 429 {
        AnalysisError::RateLimited(message)
    } else {
        AnalysisError::Service { status, message }
    }
}

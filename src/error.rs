//! Typed errors raised by the collaborator seams.
//!
//! Per-item errors never escape the batch operations in [`crate::ingest`]
//! and [`crate::analyze`]; they are logged and the item is skipped.
//! Application plumbing (config, CLI, export) uses `anyhow` instead.

use thiserror::Error;

/// Errors from the source store (metadata lookup and binary download).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("source transport error: {0}")]
    Transport(String),

    #[error("staging I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the remote catalog/store (listing and upload).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("remote store transport error: {0}")]
    Transport(String),

    #[error("remote store quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("invalid remote store response: {0}")]
    Malformed(String),

    #[error("failed to read staged file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the analysis service.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("analysis transport error: {0}")]
    Transport(String),

    #[error("invalid analysis response: {0}")]
    Malformed(String),
}

impl AnalysisError {
    /// Whether the batch should back off before the next item.
    ///
    /// Rate limits and service-call failures back off; transport and
    /// decoding failures skip the item immediately.
    pub fn is_backoff(&self) -> bool {
        matches!(
            self,
            AnalysisError::RateLimited(_) | AnalysisError::Service { .. }
        )
    }
}

/// Name resolution produced nothing usable.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NameError {
    #[error("no name could be parsed from '{0}'")]
    NoName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_classification() {
        assert!(AnalysisError::RateLimited("quota".into()).is_backoff());
        assert!(AnalysisError::Service {
            status: 503,
            message: "unavailable".into()
        }
        .is_backoff());
        assert!(!AnalysisError::Transport("reset".into()).is_backoff());
        assert!(!AnalysisError::Malformed("no candidates".into()).is_backoff());
    }
}

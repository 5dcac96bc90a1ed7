//! Error taxonomy for the ambient session.
//!
//! None of these are fatal: callers turn them into an inline message, a log
//! line, or a safe default (no background, no sound, empty favorites).

use thiserror::Error;

/// Durable store failures.  `Corrupt` never reaches a page; the store logs it
/// and reports the key as absent.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("stored value for `{key}` is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Media catalog outcomes the page must tell apart.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// Valid response with an empty result set.
    #[error("no results")]
    NoResults,
    /// Network or provider error.
    #[error("request failed: {0}")]
    FetchFailed(String),
    #[error("no credential configured for {0}")]
    MissingCredential(&'static str),
}

impl CatalogError {
    pub fn is_no_results(&self) -> bool {
        matches!(self, CatalogError::NoResults)
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::FetchFailed(e.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlaybackError {
    /// The environment refused to start audio (no player, IPC error, ...).
    #[error("playback denied: {0}")]
    Denied(String),
    /// The output went away before acknowledging the start.
    #[error("audio output closed")]
    OutputClosed,
}

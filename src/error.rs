//! Error types
//!
//! One enum per concern. Cancellation is modelled as an [`ApiError`]
//! variant so callers can tell it apart from real failures.

use std::time::Duration;

use thiserror::Error;

/// Failure of a backend request
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Superseded by a newer request or torn down with its owner
    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// Business error reported through the `state: "error"` envelope
    #[error("{message}")]
    Backend {
        message: String,
        code: Option<String>,
        status: u16,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error("request task failed: {0}")]
    Task(String),
}

impl ApiError {
    /// Cancellation is expected and never surfaced to the user
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// HTTP status attached to the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status } | ApiError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend-provided error code
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout)
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }

    pub(crate) fn from_join(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            ApiError::Cancelled
        } else {
            ApiError::Task(err.to_string())
        }
    }
}

/// Failure of a copy or download action
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid download link: unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("invalid download link: {0}")]
    MalformedUrl(String),

    #[error("failed to open URL: {0}")]
    Launch(String),

    #[error("failed to copy to clipboard: {0}")]
    Clipboard(String),
}

/// Failure reading or writing persisted settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,

    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure verifying a local image
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid SHA256 hash: {0}")]
    InvalidHash(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("SHA256 verification cancelled")]
    Cancelled,

    #[error("verification task failed: {0}")]
    Task(String),
}

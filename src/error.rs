use thiserror::Error;

/// Application-level failures.
///
/// Only two kinds exist: the remote fetch path and the local persistence
/// path. Payloads are plain strings so the error stays `Clone` and can be
/// carried inside UI messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Network, HTTP status, or response parsing failure.
    #[error("failed to fetch image: {0}")]
    Fetch(String),

    /// SQLite or image-cache filesystem failure.
    #[error("storage failed: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

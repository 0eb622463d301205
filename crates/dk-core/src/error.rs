//! # AppError
//!
//! Centralized error handling for the Docket crates.
//! Maps storage and validation failures to actionable error types.

use thiserror::Error;

use crate::models::Document;

/// The primary error type for all dk-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Item, Thread)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Required input missing or blank; lists every offending field.
    #[error("validation error: missing {}", .0.join(", "))]
    ValidationError(Vec<&'static str>),

    /// The document changed since it was read (stale revision token).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend I/O failure (disk, network, remote API)
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The document is a list but an entry could not be decoded.
    #[error("document {0} is corrupt: {1}")]
    Corrupt(Document, String),
}

impl AppError {
    /// True for failures that happened while talking to the storage backend.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            AppError::Conflict(_) | AppError::Persistence(_) | AppError::Corrupt(..)
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Persistence(format!("json: {err}"))
    }
}

/// A specialized Result type for Docket logic.
pub type Result<T> = std::result::Result<T, AppError>;

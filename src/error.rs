//! Error types for the notemap library
//!
//! This module defines all error types that can occur during indexing and
//! query operations. Errors distinguish fatal conditions (an unusable
//! repository root, an invalid search request) from the many degraded-but-
//! recoverable conditions that the crawler and cache indexes handle by
//! falling back and logging.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the notemap library
pub type Result<T> = std::result::Result<T, NotemapError>;

/// Main error type for all notemap operations
#[derive(Debug, Error)]
pub enum NotemapError {
    /// I/O errors during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The repository path was empty or consisted only of whitespace
    #[error("Repository path must not be empty")]
    RepositoryPathEmpty,

    /// The repository root does not exist
    #[error("Repository path not found: {0:?}")]
    RepositoryPathNotFound(PathBuf),

    /// The repository root exists but is not a directory
    #[error("Repository path is not a directory: {0:?}")]
    RepositoryPathNotADirectory(PathBuf),

    /// A path component violated the path model rules
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A route could not be constructed from the supplied request string
    #[error("Invalid route {value:?}: {reason}")]
    InvalidRoute {
        /// The offending route value
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Search was requested with a page number below one
    #[error("Invalid page number: {0} (pages are 1-indexed)")]
    InvalidPageNumber(usize),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotemapError {
    /// Create an invalid-route error with a custom reason
    pub fn invalid_route(value: impl Into<String>, reason: impl Into<String>) -> Self {
        NotemapError::InvalidRoute {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        NotemapError::Internal(msg.into())
    }

    /// Check if this error aborts an index build
    ///
    /// Only an unusable repository root stops the whole crawl; everything
    /// else degrades at the level where it occurred.
    pub fn is_fatal_for_build(&self) -> bool {
        matches!(
            self,
            NotemapError::RepositoryPathEmpty
                | NotemapError::RepositoryPathNotFound(_)
                | NotemapError::RepositoryPathNotADirectory(_)
        )
    }
}

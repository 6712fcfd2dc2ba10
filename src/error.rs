//! Error types for method resolution
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a whole `resolve` call. No partial descriptor is produced.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The locator no longer points inside the file's current contents
    #[error(
        "Stale location {path}:{line}: file has {line_count} lines. Was it edited after the method was loaded?"
    )]
    StaleLocation {
        path: PathBuf,
        line: u32,
        line_count: usize,
    },

    /// The file the locator names is gone
    #[error("Stale location: '{path}' no longer exists")]
    MissingFile { path: PathBuf },

    /// No balanced closer before end of file
    #[error("Cannot determine the extent of the definition at {path}:{line}: {reason}")]
    AmbiguousExtent {
        path: PathBuf,
        line: u32,
        reason: String,
    },
}

impl ResolveError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::StaleLocation { .. } | Self::MissingFile { .. } => "STALE_LOCATION",
            Self::AmbiguousExtent { .. } => "AMBIGUOUS_EXTENT",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::StaleLocation { .. } | Self::MissingFile { .. } => vec![
                "Reload the file in the running program and ask again",
                "Restart the program if the file was moved or deleted",
            ],
            Self::AmbiguousExtent { .. } => vec![
                "Check the file for an unterminated definition or string literal",
                "The file may have been truncated while the program was running",
            ],
        }
    }

    /// True for both flavors of stale locator.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleLocation { .. } | Self::MissingFile { .. })
    }
}

/// Errors loading a serialized runtime image
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to read runtime image '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Runtime image '{path}' is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Owner '{owner}' appears more than once in the runtime image")]
    DuplicateOwner { owner: String },

    #[error("Method '{name}' is bound twice on '{owner}'")]
    DuplicateMethod { owner: String, name: String },
}

/// Errors loading the fallback documentation store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read documentation store '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Documentation store '{path}' is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type alias for resolve operations
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type alias for runtime image operations
pub type ImageResult<T> = Result<T, ImageError>;

/// Result type alias for documentation store operations
pub type StoreResult<T> = Result<T, StoreError>;

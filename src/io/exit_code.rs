//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - method resolved or listing produced
//! - `1`: General error - unspecified failure
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::{ImageError, ResolveError, StoreError};

/// Standard exit codes for CLI operations.
///
/// These codes follow Unix conventions where 0 indicates success,
/// and non-zero values indicate various error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Owner or method not present in the runtime image (code 3)
    NotFound = 3,

    /// Unparseable input or no determinable extent (code 4)
    ParseError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// Locator no longer matches the file on disk (code 7)
    StaleLocation = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// Convert a `ResolveError` to the appropriate exit code.
    pub fn from_error(error: &ResolveError) -> Self {
        match error {
            ResolveError::StaleLocation { .. } | ResolveError::MissingFile { .. } => {
                ExitCode::StaleLocation
            }
            ResolveError::AmbiguousExtent { .. } => ExitCode::ParseError,
        }
    }

    pub fn from_image_error(error: &ImageError) -> Self {
        match error {
            ImageError::FileRead { .. } => ExitCode::IoError,
            ImageError::Malformed { .. }
            | ImageError::DuplicateOwner { .. }
            | ImageError::DuplicateMethod { .. } => ExitCode::ParseError,
        }
    }

    pub fn from_store_error(error: &StoreError) -> Self {
        match error {
            StoreError::FileRead { .. } => ExitCode::IoError,
            StoreError::Malformed { .. } => ExitCode::ParseError,
        }
    }

    /// Check if this exit code indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::NotFound => "Not found",
            ExitCode::ParseError => "Parse error",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::StaleLocation => "Stale location",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success as u8, 0);
        assert_eq!(ExitCode::GeneralError as u8, 1);
        assert_eq!(ExitCode::NotFound as u8, 3);
        assert_eq!(ExitCode::ParseError as u8, 4);
        assert_eq!(ExitCode::StaleLocation as u8, 7);
    }

    #[test]
    fn test_store_errors_map_to_codes() {
        let malformed = StoreError::Malformed {
            path: PathBuf::from("docs.json"),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert_eq!(ExitCode::from_store_error(&malformed), ExitCode::ParseError);

        let unreadable = StoreError::FileRead {
            path: PathBuf::from("docs.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(ExitCode::from_store_error(&unreadable), ExitCode::IoError);
    }

    #[test]
    fn test_resolve_errors_map_to_codes() {
        let stale = ResolveError::MissingFile {
            path: PathBuf::from("gone.rb"),
        };
        assert_eq!(ExitCode::from_error(&stale), ExitCode::StaleLocation);

        let ambiguous = ResolveError::AmbiguousExtent {
            path: PathBuf::from("a.rb"),
            line: 1,
            reason: "unterminated".to_string(),
        };
        assert_eq!(ExitCode::from_error(&ambiguous), ExitCode::ParseError);
    }

    #[test]
    fn test_is_success() {
        assert!(ExitCode::Success.is_success());
        assert!(!ExitCode::NotFound.is_success());
        assert!(!ExitCode::GeneralError.is_success());
        assert_eq!(ExitCode::StaleLocation.description(), "Stale location");
    }
}

//! Error types for chunklens.
//!
//! This module provides error handling following the thiserror pattern.
//! Error types are designed to be informative, actionable, and suitable for
//! both programmatic handling and user-facing display.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for chunklens operations.
#[derive(Error, Debug)]
pub enum LensError {
    /// A record line could not be parsed as JSON.
    #[error("Failed to parse record at line {line}: {message}")]
    ParseError {
        /// Line number where parsing failed (1-based).
        line: usize,
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Permission denied when accessing a file or directory.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// A persisted index document has the wrong shape.
    #[error("Invalid index document: {reason}")]
    InvalidIndex {
        /// Reason why the document is invalid.
        reason: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid argument.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the invalid argument.
        name: String,
        /// Reason why the argument is invalid.
        reason: String,
    },
}

impl LensError {
    /// Create a new parse error.
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new parse error with source.
    #[must_use]
    pub fn parse_with_source(line: usize, message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new invalid-index error.
    #[must_use]
    pub fn invalid_index(reason: impl Into<String>) -> Self {
        Self::InvalidIndex {
            reason: reason.into(),
            source: None,
        }
    }

    /// Map a file-open error to the most specific variant.
    #[must_use]
    pub fn open(path: &std::path::Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::io(format!("Failed to open {}", path.display()), source),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ParseError { .. } => exit_codes::EXIT_PARSE_ERROR,
            Self::FileNotFound { .. } => exit_codes::EXIT_FILE_NOT_FOUND,
            Self::PermissionDenied { .. } => exit_codes::EXIT_PERMISSION_DENIED,
            Self::InvalidIndex { .. } => exit_codes::EXIT_DATA_ERROR,
            Self::IoError { .. } => exit_codes::EXIT_IO_ERROR,
            Self::InvalidArgument { .. } => exit_codes::EXIT_USAGE_ERROR,
            Self::SerializationError { .. } => exit_codes::EXIT_GENERAL_ERROR,
        }
    }
}

/// Result type alias for chunklens operations.
pub type Result<T> = std::result::Result<T, LensError>;

impl From<std::io::Error> for LensError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for LensError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Record parsing failed.
    pub const EXIT_PARSE_ERROR: i32 = 2;
    /// Specified file not found.
    pub const EXIT_FILE_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid command-line usage (BSD standard).
    pub const EXIT_USAGE_ERROR: i32 = 64;
    /// Input data format error (BSD standard).
    pub const EXIT_DATA_ERROR: i32 = 65;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let parse_err = LensError::parse(1, "test");
        assert_eq!(parse_err.exit_code(), 2);

        let not_found = LensError::FileNotFound {
            path: PathBuf::from("/test"),
        };
        assert_eq!(not_found.exit_code(), 3);

        let bad_index = LensError::invalid_index("not a mapping");
        assert_eq!(bad_index.exit_code(), 65);
    }

    #[test]
    fn test_open_maps_not_found() {
        let err = LensError::open(
            std::path::Path::new("/missing"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, LensError::FileNotFound { .. }));
    }
}

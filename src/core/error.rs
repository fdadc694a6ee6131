//! Error types for the vetkit library.
//!
//! Only input-validation and configuration problems surface as errors.
//! Probe failures (network, DNS, external APIs) degrade to benign default
//! signals, and parse failures (corrupt archives or workbooks) degrade to
//! conservative findings — neither ever aborts an analysis.

use thiserror::Error;

/// The main error type for analysis requests.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No URL was provided.
    #[error("no URL was provided")]
    MissingUrl,

    /// The provided URL is not a well-formed absolute URL.
    #[error("invalid URL: {reason}")]
    InvalidUrl {
        /// Why the URL was rejected.
        reason: String,
    },

    /// A file scan was requested with no payloads.
    #[error("no files were provided")]
    EmptyFileSet,

    /// A payload exceeds the maximum accepted size.
    #[error("file size {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge {
        /// Actual payload size in bytes.
        size: u64,
        /// Maximum accepted size in bytes.
        max: u64,
    },

    /// An I/O error occurred while loading a payload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Analyzer configuration is invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// An unexpected internal error, reported without internal detail.
    #[error("internal error: {message}")]
    Internal {
        /// Generic description safe to surface to callers.
        message: String,
    },
}

impl AnalysisError {
    /// Returns `true` if the error was caused by invalid caller input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingUrl
                | Self::InvalidUrl { .. }
                | Self::EmptyFileSet
                | Self::FileTooLarge { .. }
        )
    }

    /// Creates an `InvalidUrl` error.
    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            reason: reason.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_classified() {
        assert!(AnalysisError::MissingUrl.is_input_error());
        assert!(AnalysisError::invalid_url("no host").is_input_error());
        assert!(AnalysisError::EmptyFileSet.is_input_error());
        assert!(AnalysisError::FileTooLarge { size: 2, max: 1 }.is_input_error());
        assert!(!AnalysisError::internal("boom").is_input_error());
        assert!(!AnalysisError::configuration("bad client").is_input_error());
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::FileTooLarge {
            size: 100_000_000,
            max: 50_000_000,
        };
        assert!(err.to_string().contains("100000000"));
        assert!(err.to_string().contains("50000000"));

        let err = AnalysisError::invalid_url("missing host");
        assert_eq!(err.to_string(), "invalid URL: missing host");
    }
}

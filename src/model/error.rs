//! Error types for running a feed.
//!
//! The rendering pipeline itself is total: the generator drops what it does
//! not understand, diffing has no failure mode and the mutation queue
//! resolves every job. Errors therefore only arise at the edges:
//! configuration, logging setup, fetching, and reading payloads.
//!
//! # Error Hierarchy
//!
//! - [`FeedError`] - Top-level error for running a feed
//!   - [`ConfigError`] - Config file loading and validation
//!   - [`LoggingError`] - Tracing subscriber setup
//!   - [`FetchError`] - Backend fetch failures
//!   - [`InputError`] - Payload file reading failures
//!   - [`DecodeError`] - JSON decoding failures

use crate::config::loader::ConfigError;
use crate::logging::LoggingError;
use crate::stream::loader::FetchError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for running a feed.
///
/// Domain-specific errors convert via `From`, so loaders can use `?` freely.
///
/// # Examples
///
/// ```
/// use streamfeed::model::error::{FeedError, InputError};
///
/// fn load() -> Result<(), FeedError> {
///     Err(InputError::FileNotFound { path: "/tmp/feed.json".into() })?
/// }
/// assert!(load().unwrap_err().to_string().contains("/tmp/feed.json"));
/// ```
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    /// The backend could not deliver a page.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Failed to read the payload source.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// The payload was read but does not decode into domain objects.
    #[error("Failed to decode feed payload: {0}")]
    Decode(#[from] DecodeError),
}

/// Errors encountered when reading a feed payload from disk.
#[derive(Debug, Error)]
pub enum InputError {
    /// The payload file does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// Any other I/O failure (permissions, disk errors).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors decoding a payload into domain objects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not valid JSON or does not match the object schema.
    #[error("Invalid JSON at line {line}, column {column}: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },

    /// The top-level value is not an array of objects.
    #[error("Expected an array of domain objects")]
    NotAnArray,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::InvalidJson {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn input_error_file_not_found_display() {
        let err = InputError::FileNotFound {
            path: PathBuf::from("/tmp/missing.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("File not found"));
        assert!(msg.contains("/tmp/missing.json"));
    }

    #[test]
    fn input_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let input_err: InputError = io_err.into();
        let msg = input_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn decode_error_from_serde_keeps_position() {
        let serde_err = serde_json::from_str::<Vec<u8>>("[1,\n  x]").unwrap_err();
        let err: DecodeError = serde_err.into();
        match err {
            DecodeError::InvalidJson { line, .. } => assert_eq!(line, 2),
            other => panic!("Expected InvalidJson, got {:?}", other),
        }
    }

    #[test]
    fn feed_error_from_decode_error() {
        let err: FeedError = DecodeError::NotAnArray.into();
        let msg = err.to_string();
        assert!(msg.contains("Failed to decode feed payload"));
        assert!(msg.contains("array"));
    }

    #[test]
    fn feed_error_from_config_error() {
        let err: FeedError = ConfigError::InvalidPath("STREAMFEED_CONFIG is empty".into()).into();
        assert!(matches!(err, FeedError::Config(_)));
        assert!(err.to_string().contains("STREAMFEED_CONFIG"));
    }

    #[test]
    fn feed_error_from_fetch_error() {
        let err: FeedError = FetchError::Unauthorized.into();
        assert!(err.to_string().starts_with("Fetch failed"));
    }

    #[test]
    fn feed_error_nested_io_through_input_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let feed_err: FeedError = InputError::from(io_err).into();
        let msg = feed_err.to_string();
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("gone"));
    }
}

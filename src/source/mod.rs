//! Feed payload sources.
//!
//! The driver binary reads a JSON array of tagged domain objects either from
//! a file or from piped stdin. Decoding happens here, at the boundary; the
//! rest of the crate only sees `Vec<DomainObject>`.

use crate::model::error::{DecodeError, FeedError, InputError};
use crate::model::DomainObject;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decode a JSON payload into domain objects.
///
/// # Errors
///
/// Returns `DecodeError::NotAnArray` if the top-level value is not an array,
/// and `DecodeError::InvalidJson` for any other decoding failure.
pub fn decode_payload(raw: &str) -> Result<Vec<DomainObject>, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_array() {
        return Err(DecodeError::NotAnArray);
    }
    Ok(serde_json::from_value(value)?)
}

/// Read and decode a payload file.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` for a missing file, `InputError::Io`
/// for other read failures, and `DecodeError` for malformed payloads.
pub fn read_payload_file(path: &Path) -> Result<Vec<DomainObject>, FeedError> {
    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let raw = std::fs::read_to_string(path).map_err(InputError::from)?;
    let objects = decode_payload(&raw)?;
    debug!(path = %path.display(), count = objects.len(), "Decoded payload file");
    Ok(objects)
}

/// Read a payload from the given file, or from stdin when no file is given.
///
/// # Errors
///
/// See [`read_payload_file`]; stdin read failures surface as `InputError::Io`.
pub fn read_payload(file: Option<PathBuf>) -> Result<Vec<DomainObject>, FeedError> {
    match file {
        Some(path) => read_payload_file(&path),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(InputError::from)?;
            let objects = decode_payload(&raw)?;
            debug!(count = objects.len(), "Decoded payload from stdin");
            Ok(objects)
        }
    }
}

//! Pre-flight checks on the encrypted file.
//!
//! These run before any passphrase is requested, so that an unwritable target
//! is reported up front instead of after the user has finished editing.

use crate::errors::{AccessError, AppResult};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::debug;

/// Whether the target already holds encrypted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    /// The file exists and passed the read (and write) checks.
    Existing,
    /// The file does not exist yet; the session starts from an empty document.
    Missing,
}

impl TargetStatus {
    pub fn exists(self) -> bool {
        self == TargetStatus::Existing
    }
}

/// Check that `target` can be used for a session.
///
/// Opens the file for reading and, unless `read_only`, for read-write without
/// creating or truncating it. Handles are closed immediately and nothing is read.
///
/// # Errors
///
/// - `AccessError::NotFound` if the file is missing and `read_only` is set
/// - `AccessError::NotAFile` if the path is a directory
/// - `AccessError::Unreadable` / `AccessError::Unwritable` if opening fails
///
/// # Example
///
/// ```
/// use gpgedit::access::{check_access, TargetStatus};
/// use std::path::Path;
///
/// let status = check_access(Path::new("/nonexistent/notes.gpg"), false).unwrap();
/// assert_eq!(status, TargetStatus::Missing);
///
/// assert!(check_access(Path::new("/nonexistent/notes.gpg"), true).is_err());
/// ```
pub fn check_access(target: &Path, read_only: bool) -> AppResult<TargetStatus> {
    match fs::metadata(target) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if read_only {
                return Err(AccessError::NotFound {
                    path: target.to_path_buf(),
                }
                .into());
            }
            debug!("{:?} doesn't exist yet; starting an empty document", target);
            return Ok(TargetStatus::Missing);
        }
        Ok(metadata) if metadata.is_dir() => {
            return Err(AccessError::NotAFile {
                path: target.to_path_buf(),
            }
            .into());
        }
        // Any other stat failure surfaces through the open below.
        _ => {}
    }

    File::open(target).map_err(|source| AccessError::Unreadable {
        path: target.to_path_buf(),
        source,
    })?;

    if !read_only {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(target)
            .map_err(|source| AccessError::Unwritable {
                path: target.to_path_buf(),
                source,
            })?;
    }

    Ok(TargetStatus::Existing)
}

//! Error handling utilities for the gpgedit application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use crate::constants::{EXIT_RUNTIME_ERROR, EXIT_USAGE_ERROR};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents specific error cases that can occur when interacting with external editors.
///
/// # Examples
///
/// ```
/// use gpgedit::errors::EditorError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "command not found");
/// let error = EditorError::CommandNotFound {
///     command: "vim".to_string(),
///     source: io_error,
/// };
///
/// assert!(format!("{}", error).contains("not found"));
/// assert!(format!("{}", error).contains("vim"));
/// ```
///
/// ```
/// use gpgedit::errors::EditorError;
///
/// let error = EditorError::NonZeroExit {
///     command: "vim".to_string(),
///     status_code: 1,
/// };
///
/// assert!(format!("{}", error).contains("non-zero status code"));
/// assert!(format!("{}", error).contains("1"));
/// ```
#[derive(Debug, Error)]
pub enum EditorError {
    /// Error when the specified editor command cannot be found.
    #[error("Editor command '{command}' not found: {source}. Please check that the editor is installed and available in your PATH.")]
    CommandNotFound {
        /// The editor command that was not found
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when permission is denied to execute the editor command.
    #[error("Permission denied when trying to execute editor '{command}': {source}. Please check file permissions or try running with appropriate access rights.")]
    PermissionDenied {
        /// The editor command that had permission denied
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when the editor command fails to execute due to other I/O errors.
    #[error("Failed to execute editor '{command}': {source}. Please check system resources or editor installation.")]
    ExecutionFailed {
        /// The editor command that failed to execute
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when the editor exits with a non-zero status code.
    #[error("Editor '{command}' exited with non-zero status code: {status_code}. Your changes were discarded.")]
    NonZeroExit {
        /// The editor command that exited with a non-zero status
        command: String,
        /// The exit status code
        status_code: i32,
    },

    /// The editor was killed by a signal, typically an interrupt.
    #[error("Editor '{command}' was terminated by a signal. Your changes were discarded.")]
    Terminated {
        /// The editor command
        command: String,
    },
}

/// Errors raised by the pre-flight check on the encrypted file.
///
/// None of these are ever produced after a passphrase has been requested.
///
/// ```
/// use gpgedit::errors::AccessError;
/// use std::path::PathBuf;
///
/// let error = AccessError::NotFound { path: PathBuf::from("notes.gpg") };
/// assert!(format!("{}", error).contains("read-only mode"));
/// ```
#[derive(Debug, Error)]
pub enum AccessError {
    /// The target is missing and read-only mode makes creating it pointless.
    #[error("{path:?} doesn't exist; won't attempt to create it in read-only mode")]
    NotFound {
        /// The missing target
        path: PathBuf,
    },

    /// The target exists but is not a regular file.
    #[error("{path:?} is not a regular file")]
    NotAFile {
        /// The offending path
        path: PathBuf,
    },

    /// The target cannot be opened for reading.
    #[error("can't read from file {path:?}: {source}")]
    Unreadable {
        /// The target
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The target cannot be opened for writing.
    #[error("can't write to file {path:?}: {source}")]
    Unwritable {
        /// The target
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Errors raised while provisioning the private scratch workspace.
///
/// ```
/// use gpgedit::errors::WorkspaceError;
/// use std::path::PathBuf;
///
/// let error = WorkspaceError::PermissionMismatch {
///     path: PathBuf::from("/dev/shm/alice-gpgedit"),
///     actual: 0o755,
///     expected: 0o700,
/// };
/// let message = format!("{}", error);
/// assert!(message.contains("755"));
/// assert!(message.contains("700"));
/// ```
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The workspace directory could not be created or inspected.
    #[error("Failed to create workspace directory {path:?}: {source}")]
    Create {
        /// The workspace directory
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The scratch file could not be created or inspected.
    #[error("Failed to create scratch file {path:?}: {source}")]
    ScratchCreate {
        /// The scratch file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Permission bits differ from the exact owner-only mode that was requested.
    #[error("wrong permissions on {path:?}: {actual:o} instead of {expected:o}")]
    PermissionMismatch {
        /// The path that was checked
        path: PathBuf,
        /// The permission bits found on disk
        actual: u32,
        /// The permission bits required
        expected: u32,
    },

    /// The workspace path exists but is a symlink or some other non-directory.
    #[error("workspace path {path:?} is not a directory")]
    NotADirectory {
        /// The workspace path
        path: PathBuf,
    },

    /// The workspace directory belongs to another user.
    #[error("workspace directory {path:?} is owned by uid {owner}, not by uid {expected}")]
    ForeignOwner {
        /// The workspace directory
        path: PathBuf,
        /// Owner found on disk
        owner: u32,
        /// The real uid of this process
        expected: u32,
    },
}

/// Represents specific error cases that can occur during cryptographic operations.
///
/// ```
/// use gpgedit::errors::CryptoError;
///
/// let error = CryptoError::PassphraseMismatch;
/// assert!(format!("{}", error).contains("do not match"));
/// ```
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The passphrase could not be read from the terminal.
    #[error("Failed to read passphrase: {0}")]
    PassphrasePrompt(String),

    /// An empty passphrase was entered.
    #[error("Passphrase cannot be empty")]
    EmptyPassphrase,

    /// The confirmation did not repeat the new passphrase.
    #[error("Passphrases do not match; nothing was changed")]
    PassphraseMismatch,

    /// Decryption failed: wrong passphrase, corrupt input, or a missing tool.
    #[error("decryption of {path:?} failed: {detail}")]
    DecryptFailed {
        /// The encrypted input
        path: PathBuf,
        /// What the tool reported
        detail: String,
    },

    /// Re-encryption failed. The edited plaintext exists only in `scratch`.
    #[error("encryption failed: {detail}; your edits are still in {scratch:?}")]
    EncryptFailed {
        /// The scratch file holding the only copy of the edits
        scratch: PathBuf,
        /// The encrypted file that was not updated
        target: PathBuf,
        /// What the tool reported
        detail: String,
    },
}

/// Represents all possible errors that can occur in the gpgedit application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// ```
/// use gpgedit::errors::AppError;
///
/// let error = AppError::Config("Editor command cannot be empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Editor command cannot be empty");
/// assert_eq!(error.exit_code(), 1);
/// ```
///
/// ```
/// use gpgedit::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad command-line invocation, detected before any side effect.
    #[error("Usage error: {0}")]
    Usage(String),

    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The encrypted file is unreachable.
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    /// The scratch workspace could not be provisioned safely.
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// Errors related to passphrases or the external cryptographic tool.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Errors when interacting with the text editor.
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),
}

impl AppError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => EXIT_USAGE_ERROR,
            _ => EXIT_RUNTIME_ERROR,
        }
    }

    /// The scratch file that must survive cleanup, if this is the must-preserve failure.
    ///
    /// Only a failed re-encryption qualifies: the user's edits exist nowhere else.
    pub fn preserved_scratch(&self) -> Option<&Path> {
        match self {
            AppError::Crypto(CryptoError::EncryptFailed { scratch, .. }) => Some(scratch),
            _ => None,
        }
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
pub type AppResult<T> = Result<T, AppError>;

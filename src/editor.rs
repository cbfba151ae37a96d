//! Launching the user's editor on the scratch file.
//!
//! The editor is an arbitrary external program. It is run through a
//! [`CommandRunner`] with the terminal's stdin, stdout and stderr, and the
//! session blocks until it exits.

use crate::errors::{AppError, AppResult, EditorError};
use crate::process::{CommandRunner, Invocation};
use std::io;
use std::path::Path;
use tracing::debug;

/// Open `path` in `editor` and wait for it to exit.
///
/// # Errors
///
/// Returns `AppError::Editor` with a specific `EditorError` variant depending on what went wrong:
/// - `EditorError::CommandNotFound` if the editor command doesn't exist
/// - `EditorError::PermissionDenied` if permission is denied to execute the editor
/// - `EditorError::ExecutionFailed` for other I/O errors during execution
/// - `EditorError::NonZeroExit` if the editor exits with a non-zero status code
/// - `EditorError::Terminated` if the editor was killed by a signal
pub fn launch_editor<R: CommandRunner + ?Sized>(
    runner: &R,
    editor: &str,
    path: &Path,
) -> AppResult<()> {
    debug!("Launching editor: {}", editor);

    let status = runner.run(&Invocation::new(editor).arg(path));

    match status {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(AppError::Editor(EditorError::CommandNotFound {
                command: editor.to_string(),
                source: e,
            }))
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(AppError::Editor(EditorError::PermissionDenied {
                command: editor.to_string(),
                source: e,
            }))
        }
        Err(e) => Err(AppError::Editor(EditorError::ExecutionFailed {
            command: editor.to_string(),
            source: e,
        })),
        Ok(status) if status.success() => Ok(()),
        Ok(status) => match status.code() {
            Some(status_code) => Err(AppError::Editor(EditorError::NonZeroExit {
                command: editor.to_string(),
                status_code,
            })),
            None => Err(AppError::Editor(EditorError::Terminated {
                command: editor.to_string(),
            })),
        },
    }
}

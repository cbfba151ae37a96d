/*!
# gpgedit

gpgedit lets you edit a symmetrically encrypted file as if it were plain text.
It decrypts the file into a private, permission-locked scratch file on RAM-backed
storage, opens your editor on it, and re-encrypts when the editor exits.

## Core Features

- Decrypt, edit and re-encrypt in one command, creating the file if it is new
- Scratch files live in an owner-only directory whose permissions are verified, not assumed
- Passphrases reach gpg over a private pipe, never through argv or the environment
- Read-only mode that discards edits, and passphrase rotation
- A failed re-encryption keeps the scratch file until you acknowledge its deletion

## Architecture

- `access`: pre-flight checks on the encrypted file
- `crypto`: gpg gateway, passphrase values and the secure workspace
- `editor`: launching the user's editor
- `process`: the `CommandRunner` seam over external programs
- `prompt`: terminal input for passphrases and acknowledgments
- `session`: the orchestrator tying the above together
- `cli`, `config`, `logging`, `errors`: the application shell

## Usage Example

```rust,no_run
use gpgedit::crypto::WorkspaceConfig;
use gpgedit::process::SystemRunner;
use gpgedit::prompt::TerminalPrompter;
use gpgedit::session::{EditRequest, EditSession};
use std::path::PathBuf;
use std::time::Duration;

let request = EditRequest {
    target: PathBuf::from("notes.gpg"),
    read_only: false,
    change_passphrase: false,
    editor: "vi".to_string(),
    min_duration: Duration::ZERO,
};
let workspace = WorkspaceConfig::new("/dev/shm", "alice");

let mut session = EditSession::new(request, workspace, "gpg", &SystemRunner, &TerminalPrompter);
let result = session.run();
session.conclude(&result)?;
result?;
# Ok::<(), gpgedit::AppError>(())
```
*/

#[cfg(not(unix))]
compile_error!("gpgedit relies on Unix permission bits and signals");

/// Pre-flight checks on the encrypted file
pub mod access;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Constants used throughout the application
pub mod constants;
/// gpg gateway, passphrases and the scratch workspace
pub mod crypto;
/// Editor launching
pub mod editor;
/// Error types and utilities for error handling
pub mod errors;
/// Tracing subscriber setup
pub mod logging;
/// External process invocation
pub mod process;
/// Interactive terminal input
pub mod prompt;
/// Edit session orchestration
pub mod session;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use session::{EditRequest, EditSession, SessionState};

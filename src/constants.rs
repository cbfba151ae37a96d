//! Constants used throughout the application.
//!
//! This module contains all constants used in gpgedit, organized into logical
//! groups. Having constants centralized makes them easier to find, modify, and
//! reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "gpgedit";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str =
    "Edit a symmetrically encrypted file without leaving plaintext behind";

// Exit Codes
/// Process exit code for a completed session.
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit code for any failure after the command line was accepted.
pub const EXIT_RUNTIME_ERROR: i32 = 1;
/// Process exit code for a malformed invocation.
pub const EXIT_USAGE_ERROR: i32 = 2;

// CLI Arguments & Defaults
/// Editor used when neither the flag nor the environment names one.
pub const DEFAULT_EDITOR_COMMAND: &str = "vi";
/// GnuPG binary invoked for symmetric encryption and decryption.
pub const DEFAULT_GPG_COMMAND: &str = "gpg";
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level. Kept quiet so diagnostics don't clutter the editor's terminal.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
/// Log level selected by `--verbose`.
pub const VERBOSE_LOG_LEVEL: &str = "debug";

// Configuration Keys & Environment Variables
/// Preferred visual editor.
pub const ENV_VAR_VISUAL: &str = "VISUAL";
/// Standard environment variable for specifying the default editor.
pub const ENV_VAR_EDITOR: &str = "EDITOR";
/// Overrides the gpg binary.
pub const ENV_VAR_GPGEDIT_GPG: &str = "GPGEDIT_GPG";
/// Overrides the ephemeral storage root for the workspace.
pub const ENV_VAR_GPGEDIT_WORKSPACE_ROOT: &str = "GPGEDIT_WORKSPACE_ROOT";
/// Selects `text` or `json` log output.
pub const ENV_VAR_GPGEDIT_LOG_FORMAT: &str = "GPGEDIT_LOG_FORMAT";

// Validation
/// Characters forbidden in editor commands for security reasons.
pub const EDITOR_FORBIDDEN_CHARS: &[char] =
    &['|', '&', ';', '$', '(', ')', '`', '\\', '<', '>', '\'', '"'];
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System Parameters
/// RAM-backed mount used for scratch files.
pub const DEFAULT_WORKSPACE_ROOT: &str = "/dev/shm";
/// Suffix appended to the user name to form the workspace directory name.
pub const WORKSPACE_DIR_SUFFIX: &str = "-gpgedit";
/// Exact POSIX permissions of the workspace directory (owner read/write/execute).
pub const WORKSPACE_DIR_PERMISSIONS: u32 = 0o700;
/// Exact POSIX permissions of a scratch file (owner read/write).
pub const SCRATCH_FILE_PERMISSIONS: u32 = 0o600;
/// Extensions stripped from the target name when naming the scratch file.
pub const CRYPTO_EXTENSIONS: &[&str] = &["gpg", "asc", "pgp"];
/// Number of random hex characters prefixed to a scratch file name.
pub const SCRATCH_RANDOM_LEN: usize = 12;
/// Base name used when the target has no usable file name.
pub const SCRATCH_FALLBACK_NAME: &str = "scratch";
/// Largest buffer offered to `getpwuid_r` before giving up on the lookup.
pub const PASSWD_BUFFER_LIMIT: usize = 1 << 20;

// Cryptographic Tool
/// Symmetric cipher requested for re-encryption.
pub const GPG_CIPHER_ALGO: &str = "AES256";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "gpgedit";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";

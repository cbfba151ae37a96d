//! Configuration management for the gpgedit application.
//!
//! This module resolves the runtime configuration from command-line arguments and
//! environment variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `VISUAL`: Preferred editor when `--editor` is not given
//! - `EDITOR`: Fallback editor if `VISUAL` is not set (defaults to "vi")
//! - `GPGEDIT_GPG`: gpg program when `--gpg` is not given (defaults to "gpg")
//! - `GPGEDIT_WORKSPACE_ROOT`: Ephemeral storage root (defaults to "/dev/shm")

use crate::cli::CliArgs;
use crate::constants::{
    DEFAULT_EDITOR_COMMAND, DEFAULT_GPG_COMMAND, DEFAULT_WORKSPACE_ROOT,
    EDITOR_FORBIDDEN_CHARS, ENV_VAR_EDITOR, ENV_VAR_GPGEDIT_GPG, ENV_VAR_GPGEDIT_WORKSPACE_ROOT,
    ENV_VAR_VISUAL, REDACTED_PLACEHOLDER,
};
use crate::crypto::{current_user_name, WorkspaceConfig};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for an edit session.
///
/// # Examples
///
/// ```
/// use gpgedit::Config;
/// use gpgedit::crypto::WorkspaceConfig;
/// use std::time::Duration;
///
/// let config = Config {
///     editor: "nano".to_string(),
///     gpg_program: "gpg".to_string(),
///     workspace: WorkspaceConfig::new("/dev/shm", "alice"),
///     min_duration: Duration::ZERO,
/// };
/// assert!(config.validate().is_ok());
/// ```
pub struct Config {
    /// Editor command used to open the scratch file.
    ///
    /// Resolved in the following order of precedence:
    /// 1. `--editor`
    /// 2. VISUAL
    /// 3. EDITOR
    /// 4. Defaults to "vi"
    pub editor: String,

    /// GnuPG program (`--gpg`, then `GPGEDIT_GPG`, then "gpg").
    pub gpg_program: String,

    /// Where the private scratch workspace lives and whose it is.
    pub workspace: WorkspaceConfig,

    /// Sessions shorter than this produce a warning. Zero disables it.
    pub min_duration: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("editor", &REDACTED_PLACEHOLDER)
            .field("gpg_program", &self.gpg_program)
            .field("workspace", &REDACTED_PLACEHOLDER)
            .field("min_duration", &self.min_duration)
            .finish()
    }
}

impl Config {
    /// Validates an editor command string for security.
    ///
    /// The command must be a single program: not empty, no spaces, and no
    /// shell metacharacters.
    fn validate_editor_command(editor_cmd: &str) -> AppResult<&str> {
        if editor_cmd.is_empty() {
            return Err(AppError::Config(
                "Editor command cannot be empty".to_string(),
            ));
        }

        if editor_cmd.contains(' ') {
            return Err(AppError::Config(
                "Editor command cannot contain spaces. Use a wrapper script or shell alias for editors requiring arguments".to_string(),
            ));
        }

        for &ch in EDITOR_FORBIDDEN_CHARS.iter() {
            if editor_cmd.contains(ch) {
                return Err(AppError::Config(format!(
                    "Editor command cannot contain shell metacharacters: '{}'. Use a wrapper script or shell alias instead",
                    ch
                )));
            }
        }

        Ok(editor_cmd)
    }

    /// First non-empty value among the flag and the given environment variables.
    fn resolve(flag: Option<&str>, env_keys: &[&str], default: &str) -> String {
        flag.map(str::to_string)
            .into_iter()
            .chain(env_keys.iter().filter_map(|key| env::var(key).ok()))
            .find(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Resolves configuration from the command line and environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The editor command fails validation (empty, contains spaces or shell metacharacters)
    /// - The workspace root can't be expanded or is not absolute
    pub fn load(args: &CliArgs) -> AppResult<Self> {
        let editor_raw = Self::resolve(
            args.editor.as_deref(),
            &[ENV_VAR_VISUAL, ENV_VAR_EDITOR],
            DEFAULT_EDITOR_COMMAND,
        );
        let editor = Config::validate_editor_command(&editor_raw)?;

        let gpg_program = Self::resolve(
            args.gpg.as_deref(),
            &[ENV_VAR_GPGEDIT_GPG],
            DEFAULT_GPG_COMMAND,
        );

        let root_raw = Self::resolve(
            None,
            &[ENV_VAR_GPGEDIT_WORKSPACE_ROOT],
            DEFAULT_WORKSPACE_ROOT,
        );
        let expanded_root = shellexpand::full(&root_raw)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;

        let config = Config {
            editor: editor.to_string(),
            gpg_program,
            workspace: WorkspaceConfig::new(
                PathBuf::from(expanded_root.into_owned()),
                current_user_name(),
            ),
            min_duration: args.min_duration(),
        };
        config.validate()?;

        Ok(config)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the editor or gpg program is empty, or the
    /// workspace root is not an absolute path.
    pub fn validate(&self) -> AppResult<()> {
        if self.editor.is_empty() {
            return Err(AppError::Config("Editor command is empty".to_string()));
        }

        if self.gpg_program.is_empty() {
            return Err(AppError::Config("gpg program is empty".to_string()));
        }

        if !self.workspace.root.is_absolute() {
            return Err(AppError::Config(
                "Workspace root must be an absolute path".to_string(),
            ));
        }

        Ok(())
    }
}

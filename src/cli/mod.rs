use crate::constants::{APP_DESCRIPTION, APP_NAME};
use crate::errors::{AppError, AppResult};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Edit a symmetrically encrypted file without leaving plaintext behind
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, version, long_about = None)]
pub struct CliArgs {
    /// Encrypted file to edit (created if it does not exist)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Editor to use (defaults to $VISUAL, then $EDITOR, then vi)
    #[arg(short = 'e', long, value_name = "PROGRAM")]
    pub editor: Option<String>,

    /// Read-only mode: all changes will be discarded
    #[arg(
        short = 'r',
        long = "read-only",
        visible_alias = "ro",
        conflicts_with = "change_passphrase"
    )]
    pub read_only: bool,

    /// Re-encrypt the file with a new passphrase
    #[arg(short = 'u', long)]
    pub change_passphrase: bool,

    /// Warn if the session ends after less than SECONDS seconds
    #[arg(
        short = 'w',
        long,
        value_name = "SECONDS",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub warn: i64,

    /// GnuPG program to invoke (defaults to $GPGEDIT_GPG, then gpg)
    #[arg(long, value_name = "PROGRAM")]
    pub gpg: Option<String>,

    /// Print verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Checks that clap can't express.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Usage` if `--warn` is negative.
    pub fn validate(&self) -> AppResult<()> {
        if self.warn < 0 {
            return Err(AppError::Usage(
                "the argument to --warn can't be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// The `--warn` threshold as a duration.
    pub fn min_duration(&self) -> Duration {
        Duration::from_secs(self.warn.max(0).unsigned_abs())
    }
}

//! Interactive terminal input.
//!
//! Passphrases are read without echo through `rpassword`. The recovery
//! acknowledgment after a failed re-encryption is a plain line read from stdin.

use crate::crypto::Passphrase;
use crate::errors::{AppResult, CryptoError};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Capability to ask the user for input.
pub trait Prompter {
    /// Read a passphrase without echoing it.
    fn passphrase(&self, prompt: &str) -> AppResult<Passphrase>;

    /// Show `message` and wait for the user to confirm.
    ///
    /// Returns `Ok(false)` when no confirmation could be obtained (for example
    /// stdin is closed). Callers must then leave the scratch file in place.
    fn acknowledge(&self, message: &str) -> AppResult<bool>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn passphrase(&self, prompt: &str) -> AppResult<Passphrase> {
        let secret = rpassword::prompt_password(prompt)
            .map_err(|e| CryptoError::PassphrasePrompt(e.to_string()))?;
        Ok(Passphrase::new(secret))
    }

    fn acknowledge(&self, message: &str) -> AppResult<bool> {
        print!("{}", message);
        io::stdout().flush()?;

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) => {
                debug!("stdin closed before acknowledgment");
                Ok(false)
            }
            Ok(_) => Ok(true),
            Err(e) => {
                debug!("Failed to read acknowledgment: {}", e);
                Ok(false)
            }
        }
    }
}

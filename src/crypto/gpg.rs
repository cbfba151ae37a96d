//! Symmetric encryption and decryption through the system `gpg` binary.
//!
//! The passphrase is never placed on the command line or in the environment,
//! where other local users could read it. It is written to the child's stdin
//! and gpg is told to read it from fd 0. Batch mode plus loopback pinentry makes
//! gpg fail instead of prompting, and `--no-symkey-cache` keeps gpg-agent from
//! answering with a cached passphrase.

use crate::constants::GPG_CIPHER_ALGO;
use crate::crypto::Passphrase;
use crate::errors::{AppResult, CryptoError};
use crate::process::{CommandRunner, Invocation};
use std::path::Path;
use tracing::{debug, info};

/// Flags shared by every gpg invocation.
const COMMON_ARGS: &[&str] = &[
    "--batch",
    "--yes",
    "--pinentry-mode",
    "loopback",
    "--no-symkey-cache",
    "--passphrase-fd",
    "0",
];

/// Runs gpg through a [`CommandRunner`].
pub struct CryptoGateway<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    program: String,
}

impl<'a, R: CommandRunner + ?Sized> CryptoGateway<'a, R> {
    pub fn new(runner: &'a R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// Decrypt the symmetrically encrypted `source` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::DecryptFailed` if gpg can't be started or exits
    /// non-zero (typically a wrong passphrase or corrupt input).
    pub fn decrypt(
        &self,
        source: &Path,
        destination: &Path,
        passphrase: &Passphrase,
    ) -> AppResult<()> {
        let invocation = self
            .base_invocation(passphrase)
            .arg("--decrypt")
            .arg("--output")
            .arg(destination)
            .arg(source);

        debug!("Decrypting {:?}", source);
        self.execute(&invocation).map_err(|detail| CryptoError::DecryptFailed {
            path: source.to_path_buf(),
            detail,
        })?;
        Ok(())
    }

    /// Encrypt the plaintext `source` into an ASCII-armored `destination`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EncryptFailed` if gpg can't be started or exits
    /// non-zero. The error names `source` so the caller can keep it.
    pub fn encrypt(
        &self,
        source: &Path,
        destination: &Path,
        passphrase: &Passphrase,
    ) -> AppResult<()> {
        let invocation = self
            .base_invocation(passphrase)
            .arg("--symmetric")
            .arg("--armor")
            .arg("--cipher-algo")
            .arg(GPG_CIPHER_ALGO)
            .arg("--output")
            .arg(destination)
            .arg(source);

        self.execute(&invocation).map_err(|detail| CryptoError::EncryptFailed {
            scratch: source.to_path_buf(),
            target: destination.to_path_buf(),
            detail,
        })?;
        info!("Encrypted {:?}", destination);
        Ok(())
    }

    fn base_invocation<'p>(&'p self, passphrase: &'p Passphrase) -> Invocation<'p> {
        COMMON_ARGS
            .iter()
            .fold(Invocation::new(&self.program), |inv, arg| inv.arg(arg))
            .secret(passphrase)
    }

    fn execute(&self, invocation: &Invocation<'_>) -> Result<(), String> {
        match self.runner.run(invocation) {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(format!("{} {}", self.program, status)),
            Err(e) => Err(format!("failed to run {}: {}", self.program, e)),
        }
    }
}

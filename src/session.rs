//! The edit session: decrypt, edit, re-encrypt.
//!
//! # Flow
//!
//! 1. Check that the target is reachable (no secret has been asked for yet)
//! 2. Collect the passphrase, plus a confirmed new one when changing it
//! 3. Provision the private workspace and an empty scratch file
//! 4. Decrypt into the scratch file if the target already existed
//! 5. Run the editor on the scratch file
//! 6. Re-encrypt over the target, unless read-only
//!
//! [`EditSession::conclude`] runs afterwards regardless of the outcome. When
//! re-encryption failed, the scratch file holds the only copy of the edits, so
//! it is deleted only after the user explicitly acknowledges it.

use crate::access::{check_access, TargetStatus};
use crate::crypto::{CryptoGateway, Passphrase, Passphrases, SecureWorkspace, WorkspaceConfig};
use crate::editor::launch_editor;
use crate::errors::{AppError, AppResult, CryptoError};
use crate::process::CommandRunner;
use crate::prompt::Prompter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

/// What the user asked for.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// The encrypted file.
    pub target: PathBuf,
    /// Discard edits instead of re-encrypting.
    pub read_only: bool,
    /// Re-encrypt with a new passphrase.
    pub change_passphrase: bool,
    /// Editor program.
    pub editor: String,
    /// Warn when the whole session takes less than this. Zero disables the warning.
    pub min_duration: Duration,
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Checked,
    PassphraseCollected,
    Decrypted,
    /// The target did not exist; the scratch file starts empty.
    Skipped,
    Edited,
    Encrypted,
    /// Read-only session; edits were not written back.
    ReadOnlySkip,
    Done,
    /// Absorbing failure state. `preserve_scratch` marks the must-preserve case.
    Failed { preserve_scratch: bool },
}

/// One decrypt → edit → encrypt cycle over a single file.
pub struct EditSession<'a, R: CommandRunner + ?Sized, P: Prompter + ?Sized> {
    request: EditRequest,
    workspace_config: WorkspaceConfig,
    gateway: CryptoGateway<'a, R>,
    runner: &'a R,
    prompter: &'a P,
    state: SessionState,
    workspace: Option<SecureWorkspace>,
    elapsed: Option<Duration>,
}

impl<'a, R: CommandRunner + ?Sized, P: Prompter + ?Sized> EditSession<'a, R, P> {
    pub fn new(
        request: EditRequest,
        workspace_config: WorkspaceConfig,
        gpg_program: impl Into<String>,
        runner: &'a R,
        prompter: &'a P,
    ) -> Self {
        Self {
            request,
            workspace_config,
            gateway: CryptoGateway::new(runner, gpg_program),
            runner,
            prompter,
            state: SessionState::Init,
            workspace: None,
            elapsed: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The scratch file, if one was created and has not been cleaned up yet.
    pub fn scratch(&self) -> Option<&Path> {
        self.workspace.as_ref().and_then(SecureWorkspace::scratch)
    }

    /// Wall-clock duration of the last [`run`](Self::run).
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Run the session to completion or to the first failure.
    ///
    /// The workspace is left in place for [`conclude`](Self::conclude).
    pub fn run(&mut self) -> AppResult<()> {
        let span = info_span!(
            "edit_session",
            read_only = self.request.read_only,
            change_passphrase = self.request.change_passphrase
        );
        let _enter = span.enter();

        let start = Instant::now();
        let result = self.execute();
        let elapsed = start.elapsed();
        self.elapsed = Some(elapsed);

        if let Some(warning) = elapsed_warning(elapsed, self.request.min_duration) {
            eprintln!("{}", warning);
        }

        match &result {
            Ok(()) => self.transition(SessionState::Done),
            Err(e) => {
                debug!("Session failed in state {:?}", self.state);
                self.transition(SessionState::Failed {
                    preserve_scratch: e.preserved_scratch().is_some(),
                });
            }
        }
        result
    }

    /// Tear down the workspace after [`run`](Self::run).
    ///
    /// After a must-preserve failure the user is asked to acknowledge first. If
    /// no acknowledgment arrives the scratch file is kept and its path reported.
    pub fn conclude(mut self, result: &AppResult<()>) -> AppResult<()> {
        let Some(workspace) = self.workspace.take() else {
            return Ok(());
        };

        if let Some(scratch) = result.as_ref().err().and_then(AppError::preserved_scratch) {
            let message = format!(
                "Your edits are only in {:?}.\nPress <enter> to delete the temporary file {:?}\n",
                scratch, scratch
            );
            let acknowledged = self.prompter.acknowledge(&message).unwrap_or_else(|e| {
                warn!("Failed to read acknowledgment: {}", e);
                false
            });
            if !acknowledged {
                warn!("Keeping unencrypted temporary file {:?}", scratch);
                eprintln!("The temporary file {:?} was kept; delete it once recovered.", scratch);
                workspace.keep_scratch();
                return Ok(());
            }
        }

        workspace.cleanup()
    }

    fn execute(&mut self) -> AppResult<()> {
        let status = check_access(&self.request.target, self.request.read_only)?;
        self.transition(SessionState::Checked);

        let passphrases = self.collect_passphrases(status)?;
        self.transition(SessionState::PassphraseCollected);

        let scratch = self
            .workspace
            .insert(SecureWorkspace::provision(&self.workspace_config)?)
            .create_scratch_file(&self.request.target)?;

        if status.exists() {
            self.gateway
                .decrypt(&self.request.target, &scratch, passphrases.current())?;
            self.transition(SessionState::Decrypted);
        } else {
            self.transition(SessionState::Skipped);
        }

        let encryption_key = if self.request.read_only {
            drop(passphrases);
            None
        } else {
            Some(passphrases.into_encryption_key())
        };

        launch_editor(self.runner, &self.request.editor, &scratch)?;
        self.transition(SessionState::Edited);

        match encryption_key {
            None => {
                info!("Read-only session; changes discarded");
                self.transition(SessionState::ReadOnlySkip);
            }
            Some(key) => {
                self.gateway.encrypt(&scratch, &self.request.target, &key)?;
                self.transition(SessionState::Encrypted);
            }
        }
        Ok(())
    }

    fn collect_passphrases(&self, status: TargetStatus) -> AppResult<Passphrases> {
        if !status.exists() {
            if self.request.change_passphrase {
                warn!(
                    "{:?} doesn't exist yet; there is no passphrase to change",
                    self.request.target
                );
            }
            // This passphrase will encrypt the new file, so it gets confirmed.
            let passphrase = self.prompt_confirmed("Passphrase: ", "Confirm passphrase: ")?;
            return Ok(Passphrases::new(passphrase, None));
        }

        let current = self.prompter.passphrase("Passphrase: ")?;
        let replacement = if self.request.change_passphrase {
            Some(self.prompt_confirmed("New passphrase: ", "Confirm new passphrase: ")?)
        } else {
            None
        };
        Ok(Passphrases::new(current, replacement))
    }

    fn prompt_confirmed(&self, prompt: &str, confirm: &str) -> AppResult<Passphrase> {
        let passphrase = self.prompter.passphrase(prompt)?.non_empty()?;
        let confirmation = self.prompter.passphrase(confirm)?;
        if !passphrase.matches(&confirmation) {
            return Err(CryptoError::PassphraseMismatch.into());
        }
        Ok(passphrase)
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// The warning to show when a session ended suspiciously fast.
///
/// ```
/// use gpgedit::session::elapsed_warning;
/// use std::time::Duration;
///
/// assert!(elapsed_warning(Duration::from_millis(200), Duration::from_secs(2)).is_some());
/// assert!(elapsed_warning(Duration::from_secs(3), Duration::from_secs(2)).is_none());
/// assert!(elapsed_warning(Duration::ZERO, Duration::ZERO).is_none());
/// ```
pub fn elapsed_warning(elapsed: Duration, minimum: Duration) -> Option<String> {
    if minimum.is_zero() || elapsed >= minimum {
        return None;
    }
    Some(format!(
        "Warning: editor exited after less than {} second(s)",
        minimum.as_secs()
    ))
}

//! External process invocation.
//!
//! The editor and the cryptographic tool are both run through the
//! [`CommandRunner`] trait, so the session can be driven by a fake in tests
//! without spawning anything.

use crate::crypto::Passphrase;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Write};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Command, Stdio};
use tracing::debug;

/// One external command to run.
///
/// When `secret` is set it is written to the child's standard input, which is
/// then a private pipe. Otherwise the child inherits the terminal's stdin.
/// Stdout and stderr are always inherited.
pub struct Invocation<'a> {
    pub program: &'a str,
    pub args: Vec<OsString>,
    pub secret: Option<&'a Passphrase>,
}

impl<'a> Invocation<'a> {
    pub fn new(program: &'a str) -> Self {
        Self {
            program,
            args: Vec::new(),
            secret: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn secret(mut self, secret: &'a Passphrase) -> Self {
        self.secret = Some(secret);
        self
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("secret", &self.secret.is_some())
            .finish()
    }
}

/// How a finished child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    code: Option<i32>,
}

impl CommandStatus {
    /// A process that exited normally with `code`.
    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// A process killed by a signal.
    pub fn signaled() -> Self {
        Self { code: None }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code, or `None` when the process was killed by a signal.
    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::exited(code),
            None => {
                debug!("Child terminated by signal {:?}", status.signal());
                Self::signaled()
            }
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Capability to run an external command to completion.
pub trait CommandRunner {
    /// Run the command, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns the spawn error when the process could not be started. A process
    /// that starts and then fails is reported through [`CommandStatus`].
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<CommandStatus>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<CommandStatus> {
        let mut command = Command::new(invocation.program);
        command
            .args(&invocation.args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .stdin(if invocation.secret.is_some() {
                Stdio::piped()
            } else {
                Stdio::inherit()
            });

        // SAFETY: signal(2) is async-signal-safe, so it may be called between fork and exec.
        unsafe {
            command.pre_exec(|| {
                libc::signal(libc::SIGINT, libc::SIG_DFL);
                libc::signal(libc::SIGQUIT, libc::SIG_DFL);
                Ok(())
            });
        }

        debug!(
            "Spawning {} with {} argument(s)",
            invocation.program,
            invocation.args.len()
        );

        let _guard = InterruptGuard::install();
        let mut child = command.spawn()?;

        // Taking the handle closes the pipe once written, so the child sees EOF
        // before we wait on it.
        let write_error = match (invocation.secret, child.stdin.take()) {
            (Some(secret), Some(stdin)) => write_secret(stdin, secret).err(),
            _ => None,
        };

        // Always reap the child, even when the secret could not be delivered.
        let status = child.wait()?;
        if let Some(e) = write_error {
            debug!("Child exited with {:?} after a failed stdin write", status.code());
            return Err(e);
        }
        Ok(status.into())
    }
}

/// Write `secret` to a child's stdin and close it.
///
/// A broken pipe means the child exited without reading; its exit status
/// reports that, so it is not an error here.
fn write_secret(mut stdin: impl Write, secret: &Passphrase) -> io::Result<()> {
    match stdin.write_all(secret.expose().as_bytes()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Ignores SIGINT and SIGQUIT in this process while a child runs.
///
/// An interrupt from the terminal then reaches only the child, and control
/// returns here through the child's exit status so cleanup still happens.
struct InterruptGuard {
    previous_int: libc::sighandler_t,
    previous_quit: libc::sighandler_t,
}

impl InterruptGuard {
    fn install() -> Self {
        // SAFETY: installing SIG_IGN has no handler code to race with.
        unsafe {
            Self {
                previous_int: libc::signal(libc::SIGINT, libc::SIG_IGN),
                previous_quit: libc::signal(libc::SIGQUIT, libc::SIG_IGN),
            }
        }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        // SAFETY: restores the dispositions returned by `install`.
        unsafe {
            libc::signal(libc::SIGINT, self.previous_int);
            libc::signal(libc::SIGQUIT, self.previous_quit);
        }
    }
}

//! Diagnostic logging setup.
//!
//! Logs go to stderr so they never mix with the editor's screen or with
//! anything a script reads from stdout. `RUST_LOG` overrides the level chosen
//! here.

use crate::constants::{
    DEFAULT_LOG_LEVEL, ENV_VAR_GPGEDIT_LOG_FORMAT, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
    VERBOSE_LOG_LEVEL,
};
use crate::errors::{AppError, AppResult};
use std::env;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parse a format name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for anything other than `text` or `json`.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            LOG_FORMAT_TEXT => Ok(LogFormat::Text),
            LOG_FORMAT_JSON => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Invalid log format '{}': expected '{}' or '{}'",
                other, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            ))),
        }
    }

    /// The format selected by `GPGEDIT_LOG_FORMAT`, defaulting to text.
    pub fn from_env() -> AppResult<Self> {
        match env::var(ENV_VAR_GPGEDIT_LOG_FORMAT) {
            Ok(value) if !value.is_empty() => Self::parse(&value),
            _ => Ok(LogFormat::Text),
        }
    }
}

/// The default filter directive for the given verbosity.
pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns `AppError::Config` if a subscriber is already installed.
pub fn init_tracing(verbose: bool, format: LogFormat) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(ChronoLocal::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_timer(ChronoLocal::rfc_3339())
                    .with_target(verbose)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| AppError::Config(format!("Failed to initialize logging: {}", e)))
}

//! Typed error hierarchy for the vesper session core.
//!
//! One enum per subsystem:
//! - `BackendError`: language backend transport and response failures
//! - `OracleError`: classifier call failures (always session-fatal)
//! - `NarrationError`: speech engine failures (swallowed inside the channel)
//! - `SessionError`: top-level session failures surfaced to the caller

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the language backend HTTP client.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("GOOGLE_API_KEY is not set")]
    MissingApiKey,

    #[error("request to language backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("language backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("language backend returned no usable text")]
    Empty,
}

/// Errors from the judge classifier.
///
/// A malformed (non-binary) classifier reply is not an error: it maps to
/// the repeat-phase verdict inside the judge. Only transport-level failure
/// surfaces here, and it is fatal to the session.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("classifier call failed: {0}")]
    Backend(#[from] BackendError),
}

/// Errors from speech playback.
///
/// These never leave the narration channel; they are logged and the phase
/// proceeds without audio.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("speech command is empty")]
    EmptyCommand,

    #[error("failed to spawn speech engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for speech engine: {0}")]
    Wait(#[source] std::io::Error),

    #[error("speech engine exited with code {code}")]
    EngineExit { code: i32 },
}

/// Top-level session failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to write session log at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read a reply from the console: {0}")]
    Input(#[source] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

//! Runtime configuration for a vesper session.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::backend::gemini::DEFAULT_MODEL;
use crate::narration::DEFAULT_SPEECH_CMD;

/// Resolved settings the session runs with. CLI flags win over environment
/// variables, which win over defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory the session log is written into.
    pub log_dir: PathBuf,
    /// Language backend model name.
    pub model: String,
    /// Speech command line, e.g. `espeak-ng -s 180`.
    pub speech_cmd: String,
    /// When false the narration channel only echoes text.
    pub voice_enabled: bool,
    /// Verbose oracle tracing.
    pub debug: bool,
}

impl SessionConfig {
    pub fn new(
        log_dir: Option<PathBuf>,
        model: Option<String>,
        speech_cmd: Option<String>,
        voice_enabled: bool,
        debug: bool,
    ) -> Result<Self> {
        let log_dir = match log_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to resolve working directory")?,
        };

        let speech_cmd = speech_cmd
            .or_else(|| std::env::var("VESPER_TTS_CMD").ok())
            .unwrap_or_else(|| DEFAULT_SPEECH_CMD.to_string());

        let model = model
            .or_else(|| std::env::var("VESPER_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            log_dir,
            model,
            speech_cmd,
            voice_enabled,
            debug,
        })
    }

    /// Create the log directory if it does not exist yet.
    pub fn ensure_log_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.log_dir).context("Failed to create log directory")?;
        Ok(())
    }
}

//! Speech synthesis engines.
//!
//! The channel drives playback through the `SpeechEngine` trait; the
//! production engine shells out to a TTS command and kills it on
//! cancellation. Tests substitute fakes.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::errors::NarrationError;

/// Default speech command. espeak-ng plays straight to the audio device,
/// and `-s` sets words per minute.
pub const DEFAULT_SPEECH_CMD: &str = "espeak-ng -s 180";

/// A playback backend. `play` returns when the utterance finishes or when
/// `cancel` fires, whichever comes first. On cancellation the engine must
/// terminate promptly; a cancelled playback is not an error.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn play(&self, text: &str, cancel: CancellationToken) -> Result<(), NarrationError>;
}

/// Engine that spawns an external TTS command with the utterance as the
/// final argument.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    /// Parse a whitespace-separated command line, e.g. `espeak-ng -s 180`
    /// or `say -v Samantha`.
    pub fn new(command_line: &str) -> Result<Self, NarrationError> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts.next().ok_or(NarrationError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl SpeechEngine for CommandSpeech {
    async fn play(&self, text: &str, cancel: CancellationToken) -> Result<(), NarrationError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| NarrationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tokio::select! {
            _ = cancel.cancelled() => {
                // Terminate signal plus join, not a cooperative drain.
                let _ = child.start_kill();
                let _ = child.wait().await;
                Ok(())
            }
            status = child.wait() => {
                let status = status.map_err(NarrationError::Wait)?;
                if status.success() {
                    Ok(())
                } else {
                    Err(NarrationError::EngineExit {
                        code: status.code().unwrap_or(-1),
                    })
                }
            }
        }
    }
}

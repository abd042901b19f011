//! Human input seam.
//!
//! The session blocks on one console reply per gated exchange, with no
//! timeout. The blocking read runs on the blocking pool so narration keeps
//! playing underneath it.

use async_trait::async_trait;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::errors::SessionError;

/// Source of human replies.
#[async_trait]
pub trait HumanInput: Send {
    /// Block until the user submits a line. Empty input is allowed; the
    /// orchestrator substitutes a sentinel for it.
    async fn read_reply(&mut self, prompt: &str) -> Result<String, SessionError>;
}

/// Console implementation over dialoguer.
pub struct ConsoleInput;

#[async_trait]
impl HumanInput for ConsoleInput {
    async fn read_reply(&mut self, prompt: &str) -> Result<String, SessionError> {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })
        .await
        .map_err(|join_err| SessionError::Input(std::io::Error::other(join_err)))?
        .map_err(|err| SessionError::Input(std::io::Error::other(err)))
    }
}

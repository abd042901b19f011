//! Language backend seam.
//!
//! The orchestrator and the judge both talk to the model through
//! `LanguageBackend`, so tests can swap in a scripted double and the
//! production binary can wire in the Gemini client.

pub mod gemini;

use async_trait::async_trait;

use crate::errors::BackendError;

pub use gemini::GeminiClient;

/// Temperature for utterance generation.
pub const SESSION_TEMPERATURE: f32 = 0.7;

/// Temperature for classifier calls. Zero for reproducibility.
pub const JUDGE_TEMPERATURE: f32 = 0.0;

/// One completion call: persona, user prompt, sampling temperature.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature,
        }
    }
}

/// An external text-completion collaborator.
#[async_trait]
pub trait LanguageBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BackendError>;
}

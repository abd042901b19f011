//! Judge oracle: binary classification over the transcript tail.
//!
//! Two questions gate the session's self-looping phases: has enough been
//! shared to analyze the day (sufficiency), and did the latest reply agree
//! (sentiment). Both go through the language backend at temperature zero
//! and come back as a strict bool.

use async_trait::async_trait;
use tracing::debug;

use crate::backend::{CompletionRequest, JUDGE_TEMPERATURE, LanguageBackend};
use crate::errors::OracleError;
use crate::prompts::{SENTIMENT_INSTRUCTION, SUFFICIENCY_INSTRUCTION};
use crate::transcript::Transcript;

/// How many trailing transcript entries the classifier sees.
const JUDGE_CONTEXT_TURNS: usize = 8;

const JUDGE_SYSTEM: &str =
    "You classify conversation transcripts. Answer with exactly one word.";

/// External binary classifier consulted by gated phases.
#[async_trait]
pub trait JudgeOracle: Send + Sync {
    /// Has enough been shared to synthesize results?
    async fn sufficiency(&self, transcript: &Transcript) -> Result<bool, OracleError>;

    /// Did the most recent human reply indicate agreement?
    async fn sentiment(&self, transcript: &Transcript) -> Result<bool, OracleError>;
}

/// Judge implementation backed by the language model.
pub struct BackendJudge<B> {
    backend: B,
    verbose: bool,
}

impl<B: LanguageBackend> BackendJudge<B> {
    pub fn new(backend: B, verbose: bool) -> Self {
        Self { backend, verbose }
    }

    async fn classify(
        &self,
        transcript: &Transcript,
        instruction: &str,
    ) -> Result<bool, OracleError> {
        let tail = Transcript::render(transcript.tail(JUDGE_CONTEXT_TURNS));
        let prompt = format!("{tail}\n{instruction}");
        let reply = self
            .backend
            .complete(CompletionRequest::new(JUDGE_SYSTEM, prompt, JUDGE_TEMPERATURE))
            .await?;

        let verdict = is_affirmative(&reply);
        if self.verbose {
            debug!(%reply, verdict, "judge reply");
        }
        Ok(verdict)
    }
}

#[async_trait]
impl<B: LanguageBackend> JudgeOracle for BackendJudge<B> {
    async fn sufficiency(&self, transcript: &Transcript) -> Result<bool, OracleError> {
        self.classify(transcript, SUFFICIENCY_INSTRUCTION).await
    }

    async fn sentiment(&self, transcript: &Transcript) -> Result<bool, OracleError> {
        self.classify(transcript, SENTIMENT_INSTRUCTION).await
    }
}

/// Map a classifier reply onto a verdict.
///
/// Only a reply whose first word is YES (any case, trailing punctuation
/// tolerated) advances; everything else repeats the phase, so a confused
/// model can never cut a session short.
fn is_affirmative(reply: &str) -> bool {
    reply
        .split_whitespace()
        .next()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_ascii_alphanumeric())
                .eq_ignore_ascii_case("yes")
        })
        .unwrap_or(false)
}

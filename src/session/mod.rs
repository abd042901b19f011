//! Session state: the single mutable record the orchestrator owns.

pub mod log;

use std::fmt;

use tracing::debug;

use crate::transcript::Transcript;

/// How the session was seeded. Set once at intake, immutable thereafter;
/// `None` only exists before intake runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    None,
    SingleText,
    DualText,
    Conversational,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::None => write!(f, "none"),
            InputMode::SingleText => write!(f, "single-text"),
            InputMode::DualText => write!(f, "dual-text"),
            InputMode::Conversational => write!(f, "conversational"),
        }
    }
}

/// Mutable session record, owned exclusively by the orchestrator for the
/// session's lifetime and discarded after the log write.
#[derive(Debug, Default)]
pub struct SessionState {
    input_mode: InputMode,
    pub prior_text: String,
    pub current_text: String,
    pub transcript: Transcript,
    analysis_summary: Option<String>,
    committed_plan: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Fix the input mode. Only the first call takes effect.
    pub fn set_input_mode(&mut self, mode: InputMode) {
        if self.input_mode != InputMode::None {
            debug!(current = %self.input_mode, "input mode already fixed, ignoring");
            return;
        }
        self.input_mode = mode;
    }

    pub fn analysis_summary(&self) -> Option<&str> {
        self.analysis_summary.as_deref()
    }

    /// Record the analysis summary. Write-once-effective: a later write
    /// over a non-empty value is suppressed, so re-entering the analysis
    /// phase cannot clobber the original.
    pub fn set_analysis_summary(&mut self, summary: impl Into<String>) {
        if self.analysis_summary.as_deref().is_some_and(|s| !s.is_empty()) {
            debug!("analysis summary already set, suppressing rewrite");
            return;
        }
        self.analysis_summary = Some(summary.into());
    }

    pub fn committed_plan(&self) -> Option<&str> {
        self.committed_plan.as_deref()
    }

    /// Record the current plan proposal. Each re-proposal replaces the
    /// previous one wholesale; once set the plan is never cleared.
    pub fn set_committed_plan(&mut self, plan: impl Into<String>) {
        self.committed_plan = Some(plan.into());
    }
}

//! The session state machine.
//!
//! `SessionRunner` drives one session from intake to persistence. Each
//! gated phase follows the same protocol on every visit: produce an agent
//! utterance, narrate it, block for one human reply, append both to the
//! transcript, then ask the judge whether to repeat or advance. Routing
//! itself lives in `phase::transition`; the handlers only gather the
//! inputs to it.

use chrono::Local;
use std::path::PathBuf;
use tracing::debug;

use crate::backend::{CompletionRequest, LanguageBackend, SESSION_TEMPERATURE};
use crate::config::SessionConfig;
use crate::content::ContentKind;
use crate::errors::SessionError;
use crate::input::HumanInput;
use crate::narration::NarrationChannel;
use crate::oracle::JudgeOracle;
use crate::phase::{Phase, transition};
use crate::prompts;
use crate::session::log::write_session_log;
use crate::session::{InputMode, SessionState};
use crate::transcript::Role;
use crate::ui;

/// What a finished session leaves behind.
#[derive(Debug)]
pub struct SessionOutcome {
    pub log_file: PathBuf,
}

/// Which judge question gates an exchange.
#[derive(Clone, Copy)]
enum GateKind {
    Sufficiency,
    Sentiment,
}

/// Visit counters for the self-looping phases. First visits and re-visits
/// phrase their utterances differently.
#[derive(Default)]
struct Visits {
    interview: u32,
    affirm: u32,
    plan: u32,
}

pub struct SessionRunner<B, J, I> {
    config: SessionConfig,
    content: ContentKind,
    backend: B,
    judge: J,
    input: I,
    narrator: NarrationChannel,
    state: SessionState,
    visits: Visits,
    log_file: Option<PathBuf>,
}

impl<B, J, I> SessionRunner<B, J, I>
where
    B: LanguageBackend,
    J: JudgeOracle,
    I: HumanInput,
{
    pub fn new(
        config: SessionConfig,
        content: ContentKind,
        backend: B,
        judge: J,
        input: I,
        narrator: NarrationChannel,
    ) -> Self {
        Self {
            config,
            content,
            backend,
            judge,
            input,
            narrator,
            state: SessionState::new(),
            visits: Visits::default(),
            log_file: None,
        }
    }

    /// Drive the session to completion.
    ///
    /// Whatever happens, no playback task outlives this call: the narration
    /// channel is stopped on both the success and the error path.
    pub async fn run(mut self) -> Result<SessionOutcome, SessionError> {
        let result = self.drive().await;
        self.narrator.stop().await;
        result?;

        let log_file = self.log_file.take().ok_or_else(|| {
            SessionError::Other(anyhow::anyhow!("session finished without writing a log"))
        })?;
        Ok(SessionOutcome { log_file })
    }

    async fn drive(&mut self) -> Result<(), SessionError> {
        let mut phase = Phase::Intake;
        while phase != Phase::Done {
            debug!(%phase, "entering phase");
            phase = self.step(phase).await?;
        }
        Ok(())
    }

    async fn step(&mut self, phase: Phase) -> Result<Phase, SessionError> {
        match phase {
            Phase::Intake => self.intake(),
            Phase::Interview => self.interview().await,
            Phase::Analyze => self.analyze().await,
            Phase::Affirm => self.affirm().await,
            Phase::Plan => self.plan().await,
            Phase::Close => self.close().await,
            Phase::Persist => self.persist(),
            Phase::Done => Ok(Phase::Done),
        }
    }

    // =========================================
    // Phase handlers
    // =========================================

    fn intake(&mut self) -> Result<Phase, SessionError> {
        match &self.content {
            ContentKind::Conversational => {
                ui::note("no notes to read tonight, so we'll just talk");
                self.state.set_input_mode(InputMode::Conversational);
            }
            ContentKind::SingleText { text } => {
                ui::note("read through today's notes");
                self.state.current_text = text.clone();
                self.state.set_input_mode(InputMode::SingleText);
            }
            ContentKind::DualText { prior_text, text } => {
                ui::note("read yesterday's notes and today's");
                self.state.prior_text = prior_text.clone();
                self.state.current_text = text.clone();
                self.state.set_input_mode(InputMode::DualText);
            }
        }

        self.state.transcript.push(Role::System, prompts::PERSONA);
        Ok(transition(Phase::Intake, self.state.input_mode(), None))
    }

    async fn interview(&mut self) -> Result<Phase, SessionError> {
        let first_visit = self.visits.interview == 0;
        self.visits.interview += 1;

        let utterance = if first_visit {
            prompts::INTERVIEW_GREETING.to_string()
        } else {
            let prompt = prompts::interview_followup(self.state.transcript.tail(8));
            self.complete(prompt).await?
        };

        let verdict = self.gated_exchange(utterance, GateKind::Sufficiency).await?;

        if verdict {
            self.narrator.speak(prompts::INTERVIEW_ACK).await;
            self.state.transcript.push(Role::Agent, prompts::INTERVIEW_ACK);

            // What was shared in conversation stands in for today's notes.
            let shared: Vec<&str> = self
                .state
                .transcript
                .iter()
                .filter(|m| m.role == Role::Human)
                .map(|m| m.text.as_str())
                .collect();
            self.state.current_text = shared.join("\n");
        }

        Ok(transition(
            Phase::Interview,
            self.state.input_mode(),
            Some(verdict),
        ))
    }

    async fn analyze(&mut self) -> Result<Phase, SessionError> {
        if self
            .state
            .analysis_summary()
            .is_some_and(|s| !s.is_empty())
        {
            debug!("analysis already present, skipping");
            return Ok(transition(Phase::Analyze, self.state.input_mode(), None));
        }

        let prompt = match self.state.input_mode() {
            InputMode::DualText => {
                prompts::analysis_dual(&self.state.prior_text, &self.state.current_text)
            }
            _ => prompts::analysis_single(&self.state.current_text),
        };

        let spinner = ui::thinking_spinner("thinking it over...");
        let result = self.complete(prompt).await;
        spinner.finish_and_clear();

        self.state.set_analysis_summary(result?);
        Ok(transition(Phase::Analyze, self.state.input_mode(), None))
    }

    async fn affirm(&mut self) -> Result<Phase, SessionError> {
        let first_visit = self.visits.affirm == 0;
        self.visits.affirm += 1;

        let summary = self.state.analysis_summary().unwrap_or_default().to_string();
        let prompt = if first_visit {
            prompts::affirm(&summary)
        } else {
            let last = self.last_reply();
            prompts::affirm_revisit(&summary, &last)
        };

        let utterance = self.complete(prompt).await?;
        let verdict = self.gated_exchange(utterance, GateKind::Sentiment).await?;
        Ok(transition(
            Phase::Affirm,
            self.state.input_mode(),
            Some(verdict),
        ))
    }

    async fn plan(&mut self) -> Result<Phase, SessionError> {
        let first_visit = self.visits.plan == 0;
        self.visits.plan += 1;

        let summary = self.state.analysis_summary().unwrap_or_default().to_string();
        let prompt = if first_visit {
            prompts::plan(&summary)
        } else {
            let last = self.last_reply();
            prompts::plan_revisit(&summary, &last)
        };

        let utterance = self.complete(prompt).await?;
        // Every proposal replaces the previous one; the latest is what the
        // log records as tomorrow's focus.
        self.state.set_committed_plan(utterance.clone());

        let verdict = self.gated_exchange(utterance, GateKind::Sentiment).await?;
        Ok(transition(
            Phase::Plan,
            self.state.input_mode(),
            Some(verdict),
        ))
    }

    async fn close(&mut self) -> Result<Phase, SessionError> {
        let utterance = self.complete(prompts::CLOSE_PROMPT.to_string()).await?;
        self.narrator.speak(&utterance).await;
        self.state.transcript.push(Role::Agent, utterance);
        Ok(transition(Phase::Close, self.state.input_mode(), None))
    }

    fn persist(&mut self) -> Result<Phase, SessionError> {
        let now = Local::now();
        let path = write_session_log(&self.config.log_dir, &self.state, &now)?;
        ui::saved_line(&path);
        self.log_file = Some(path);
        Ok(transition(Phase::Persist, self.state.input_mode(), None))
    }

    // =========================================
    // Shared plumbing
    // =========================================

    /// One gated exchange: narrate, take a reply, extend the transcript,
    /// consult the judge over the updated tail.
    async fn gated_exchange(
        &mut self,
        utterance: String,
        gate: GateKind,
    ) -> Result<bool, SessionError> {
        self.narrator.speak(&utterance).await;

        let reply = self.input.read_reply("you").await?;
        let reply = if reply.trim().is_empty() {
            prompts::SILENT_REPLY.to_string()
        } else {
            reply
        };

        self.state.transcript.push(Role::Agent, utterance);
        self.state.transcript.push(Role::Human, reply);

        let verdict = match gate {
            GateKind::Sufficiency => self.judge.sufficiency(&self.state.transcript).await?,
            GateKind::Sentiment => self.judge.sentiment(&self.state.transcript).await?,
        };
        Ok(verdict)
    }

    async fn complete(&self, prompt: String) -> Result<String, SessionError> {
        let request = CompletionRequest::new(prompts::PERSONA, prompt, SESSION_TEMPERATURE);
        Ok(self.backend.complete(request).await?)
    }

    fn last_reply(&self) -> String {
        self.state
            .transcript
            .last_human()
            .unwrap_or(prompts::SILENT_REPLY)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;

    use crate::errors::{BackendError, NarrationError, OracleError};
    use crate::narration::SpeechEngine;
    use crate::transcript::Transcript;

    // =========================================
    // Doubles
    // =========================================

    /// Backend replying with canned texts in order.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedBackend {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl LanguageBackend for ScriptedBackend {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, BackendError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(BackendError::Empty)
        }
    }

    /// Judge returning scripted verdicts and counting calls per question.
    #[derive(Default)]
    struct ScriptedJudge {
        sufficiency: Mutex<VecDeque<bool>>,
        sentiment: Mutex<VecDeque<bool>>,
        sufficiency_calls: AtomicUsize,
        sentiment_calls: AtomicUsize,
    }

    impl ScriptedJudge {
        fn new(sufficiency: &[bool], sentiment: &[bool]) -> Self {
            Self {
                sufficiency: Mutex::new(sufficiency.iter().copied().collect()),
                sentiment: Mutex::new(sentiment.iter().copied().collect()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl JudgeOracle for ScriptedJudge {
        async fn sufficiency(&self, _t: &Transcript) -> Result<bool, OracleError> {
            self.sufficiency_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .sufficiency
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected sufficiency call"))
        }

        async fn sentiment(&self, _t: &Transcript) -> Result<bool, OracleError> {
            self.sentiment_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .sentiment
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected sentiment call"))
        }
    }

    /// Input source popping scripted replies, empty when exhausted.
    struct ScriptedInput {
        replies: VecDeque<String>,
    }

    impl ScriptedInput {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: replies.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl HumanInput for ScriptedInput {
        async fn read_reply(&mut self, _prompt: &str) -> Result<String, SessionError> {
            Ok(self.replies.pop_front().unwrap_or_default())
        }
    }

    /// Engine that finishes instantly; tests here care about phase flow,
    /// not playback.
    struct InstantEngine;

    #[async_trait]
    impl SpeechEngine for InstantEngine {
        async fn play(
            &self,
            _text: &str,
            _cancel: CancellationToken,
        ) -> Result<(), NarrationError> {
            Ok(())
        }
    }

    fn runner(
        dir: &std::path::Path,
        content: ContentKind,
        backend: ScriptedBackend,
        judge: ScriptedJudge,
        input: ScriptedInput,
    ) -> SessionRunner<ScriptedBackend, ScriptedJudge, ScriptedInput> {
        let config = SessionConfig::new(
            Some(dir.to_path_buf()),
            None,
            None,
            true,
            false,
        )
        .unwrap();
        let narrator = NarrationChannel::new(Arc::new(InstantEngine), true);
        SessionRunner::new(config, content, backend, judge, input, narrator)
    }

    // =========================================
    // Phase routing
    // =========================================

    #[tokio::test]
    async fn dual_text_intake_never_enters_interview() {
        let dir = tempdir().unwrap();
        let mut r = runner(
            dir.path(),
            ContentKind::DualText {
                prior_text: "- plan report".into(),
                text: "- report done".into(),
            },
            ScriptedBackend::new(&[]),
            ScriptedJudge::new(&[], &[]),
            ScriptedInput::new(&[]),
        );

        let next = r.step(Phase::Intake).await.unwrap();
        assert_eq!(next, Phase::Analyze);
        assert_eq!(r.state.input_mode(), InputMode::DualText);
    }

    #[tokio::test]
    async fn conversational_intake_routes_to_interview() {
        let dir = tempdir().unwrap();
        let mut r = runner(
            dir.path(),
            ContentKind::Conversational,
            ScriptedBackend::new(&[]),
            ScriptedJudge::new(&[], &[]),
            ScriptedInput::new(&[]),
        );

        let next = r.step(Phase::Intake).await.unwrap();
        assert_eq!(next, Phase::Interview);
    }

    #[tokio::test]
    async fn interview_self_loop_makes_n_plus_one_oracle_calls() {
        let dir = tempdir().unwrap();
        let mut r = runner(
            dir.path(),
            ContentKind::Conversational,
            // Two follow-up questions for the two re-visits.
            ScriptedBackend::new(&["what else happened?", "and how did that feel?"]),
            ScriptedJudge::new(&[false, false, true], &[]),
            ScriptedInput::new(&["busy", "meetings all day", "tired but okay"]),
        );

        let mut phase = r.step(Phase::Intake).await.unwrap();
        let mut interview_rounds = 0;
        while phase == Phase::Interview {
            phase = r.step(phase).await.unwrap();
            interview_rounds += 1;
        }

        assert_eq!(interview_rounds, 3);
        assert_eq!(phase, Phase::Analyze);
        assert_eq!(r.judge.sufficiency_calls.load(Ordering::SeqCst), 3);
        // Everything shared becomes the day's text for analysis.
        assert!(r.state.current_text.contains("busy"));
        assert!(r.state.current_text.contains("tired but okay"));
    }

    #[tokio::test]
    async fn transcript_length_never_decreases_across_handlers() {
        let dir = tempdir().unwrap();
        let mut r = runner(
            dir.path(),
            ContentKind::Conversational,
            ScriptedBackend::new(&["summary", "praise", "plan", "goodnight"]),
            ScriptedJudge::new(&[true], &[true, true]),
            ScriptedInput::new(&["fine", "thanks", "deal"]),
        );

        let mut phase = Phase::Intake;
        let mut last_len = 0;
        while phase != Phase::Done {
            phase = r.step(phase).await.unwrap();
            let len = r.state.transcript.len();
            assert!(len >= last_len, "transcript shrank entering {phase}");
            last_len = len;
        }
    }

    // =========================================
    // State invariants
    // =========================================

    #[tokio::test]
    async fn analysis_summary_survives_a_second_analyze_visit() {
        let dir = tempdir().unwrap();
        let mut r = runner(
            dir.path(),
            ContentKind::SingleText {
                text: "- wrote tests".into(),
            },
            ScriptedBackend::new(&["first summary", "second summary"]),
            ScriptedJudge::new(&[], &[]),
            ScriptedInput::new(&[]),
        );

        r.step(Phase::Intake).await.unwrap();
        r.step(Phase::Analyze).await.unwrap();
        assert_eq!(r.state.analysis_summary(), Some("first summary"));

        // A second visit is a no-op; the backend is not even consulted.
        r.step(Phase::Analyze).await.unwrap();
        assert_eq!(r.state.analysis_summary(), Some("first summary"));
        assert_eq!(r.backend.replies.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn plan_reproposal_overwrites_the_committed_plan() {
        let dir = tempdir().unwrap();
        let mut r = runner(
            dir.path(),
            ContentKind::SingleText {
                text: "- wrote tests".into(),
            },
            ScriptedBackend::new(&["summary", "praise", "first plan", "second plan"]),
            ScriptedJudge::new(&[], &[true, false, true]),
            ScriptedInput::new(&["thanks", "too much", "that works"]),
        );

        let mut phase = Phase::Intake;
        while phase != Phase::Close {
            phase = r.step(phase).await.unwrap();
        }

        assert_eq!(r.state.committed_plan(), Some("second plan"));
        assert_eq!(r.visits.plan, 2);
    }

    #[tokio::test]
    async fn empty_reply_is_recorded_as_the_sentinel() {
        let dir = tempdir().unwrap();
        let mut r = runner(
            dir.path(),
            ContentKind::SingleText {
                text: "- rested".into(),
            },
            ScriptedBackend::new(&["summary", "praise"]),
            ScriptedJudge::new(&[], &[true]),
            ScriptedInput::new(&["   "]),
        );

        r.step(Phase::Intake).await.unwrap();
        r.step(Phase::Analyze).await.unwrap();
        r.step(Phase::Affirm).await.unwrap();

        assert_eq!(r.state.transcript.last_human(), Some(prompts::SILENT_REPLY));
    }

    #[tokio::test]
    async fn oracle_failure_is_session_fatal() {
        let dir = tempdir().unwrap();
        // Judge deque is empty: panic would be wrong, so use a judge that
        // errors instead.
        struct FailingJudge;

        #[async_trait]
        impl JudgeOracle for FailingJudge {
            async fn sufficiency(&self, _t: &Transcript) -> Result<bool, OracleError> {
                Err(OracleError::Backend(BackendError::Empty))
            }
            async fn sentiment(&self, _t: &Transcript) -> Result<bool, OracleError> {
                Err(OracleError::Backend(BackendError::Empty))
            }
        }

        let config = SessionConfig::new(
            Some(dir.path().to_path_buf()),
            None,
            None,
            true,
            false,
        )
        .unwrap();
        let narrator = NarrationChannel::new(Arc::new(InstantEngine), true);
        let runner = SessionRunner::new(
            config,
            ContentKind::Conversational,
            ScriptedBackend::new(&[]),
            FailingJudge,
            ScriptedInput::new(&["a day"]),
            narrator,
        );

        let result = runner.run().await;
        assert!(matches!(result, Err(SessionError::Oracle(_))));
    }
}

//! Interruptible narration channel.
//!
//! At most one playback task is alive at any instant. `speak` displays the
//! utterance and starts playback as a background task, first cancelling and
//! joining whatever was still speaking; `stop` is the idempotent form of
//! that cancel-and-join. Playback failures are logged and swallowed so a
//! broken audio setup never stalls the session.

pub mod engine;

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::ui;

pub use engine::{CommandSpeech, DEFAULT_SPEECH_CMD, SpeechEngine};

struct Playback {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Single-slot, cancel-on-supersede speech resource.
///
/// Constructed once and handed to the orchestrator; the slot mutex makes
/// even concurrent `speak`/`stop` calls unable to leave two playback tasks
/// alive.
pub struct NarrationChannel {
    engine: Arc<dyn SpeechEngine>,
    slot: Mutex<Option<Playback>>,
    voice_enabled: bool,
}

impl NarrationChannel {
    pub fn new(engine: Arc<dyn SpeechEngine>, voice_enabled: bool) -> Self {
        Self {
            engine,
            slot: Mutex::new(None),
            voice_enabled,
        }
    }

    /// Display `text` and speak it in the background.
    ///
    /// Any active playback is cancelled and joined before the new one
    /// starts, so narration episodes strictly supersede one another.
    pub async fn speak(&self, text: &str) {
        let mut slot = self.slot.lock().await;
        Self::cancel_and_join(&mut slot).await;

        ui::narration_line(text);

        if !self.voice_enabled {
            return;
        }

        let cancel = CancellationToken::new();
        let engine = Arc::clone(&self.engine);
        let task_cancel = cancel.clone();
        let utterance = text.to_string();
        let task = tokio::spawn(async move {
            if let Err(err) = engine.play(&utterance, task_cancel).await {
                warn!(error = %err, "speech playback failed");
            }
        });

        *slot = Some(Playback { cancel, task });
    }

    /// Cancel the active playback, if any, and wait for it to terminate.
    /// Safe to call repeatedly or when nothing is speaking.
    pub async fn stop(&self) {
        let mut slot = self.slot.lock().await;
        Self::cancel_and_join(&mut slot).await;
    }

    async fn cancel_and_join(slot: &mut Option<Playback>) {
        if let Some(playback) = slot.take() {
            playback.cancel.cancel();
            if let Err(err) = playback.task.await {
                if !err.is_cancelled() {
                    warn!(error = %err, "playback task panicked");
                }
            }
        }
    }
}

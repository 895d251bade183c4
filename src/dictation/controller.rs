//! Dictation controller — a small state machine over the recognition engine.
//!
//! Continuous recognition engines terminate spontaneously (silence timeouts,
//! service hiccups), so a session that the user thinks of as "one recording"
//! spans any number of engine restarts. The controller keeps two independent
//! pieces of state to make that work:
//!
//! * `listening` — whether the engine should currently be running; what a UI
//!   would display.
//! * `intent` — the user's last explicit directive. Read by the `End`
//!   handler to decide between auto-restart and staying stopped.
//!
//! They are separate because `End` is asynchronous: it can arrive *after*
//! the user pressed stop but *before* a naive implementation would have
//! updated its flag. [`stop`](DictationController::stop) therefore flips
//! the intent before telling the engine to stop, which guarantees a late
//! `End` always observes `Stopped` and never restarts the engine.

use crate::report::ReportAccumulator;

use super::engine::{
    DictationError, RecognitionEngine, RecognitionEvent, NO_SPEECH,
};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Whether the engine should currently be capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenState {
    #[default]
    Idle,
    Listening,
}

/// The user's last explicit directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserIntent {
    Listening,
    #[default]
    Stopped,
}

/// The two flags exposed together so callbacks and UI read one coherent
/// snapshot instead of two uncoordinated variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DictationSession {
    pub listening: ListenState,
    pub intent: UserIntent,
}

// ---------------------------------------------------------------------------
// DictationController
// ---------------------------------------------------------------------------

/// Drives one dictation session, translating engine notifications into
/// ordered appends on the report accumulator.
pub struct DictationController<E: RecognitionEngine> {
    /// `None` when no recognition capability exists on this system.
    engine: Option<E>,
    session: DictationSession,
}

impl<E: RecognitionEngine> DictationController<E> {
    /// Wrap a recognition engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine: Some(engine),
            session: DictationSession::default(),
        }
    }

    /// Build a controller for a system without a recognition capability.
    /// Every [`start`](Self::start) fails with [`DictationError::Unavailable`]
    /// and no state transition is attempted.
    pub fn unavailable() -> Self {
        Self {
            engine: None,
            session: DictationSession::default(),
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> DictationSession {
        self.session
    }

    /// Returns `true` while the engine should be capturing.
    pub fn is_listening(&self) -> bool {
        self.session.listening == ListenState::Listening
    }

    /// User action: begin dictating.
    ///
    /// No-op when already listening. Fails without touching state when the
    /// capability is absent; rolls back to idle if the engine cannot start.
    pub async fn start(&mut self) -> Result<(), DictationError> {
        let engine = self.engine.as_mut().ok_or(DictationError::Unavailable)?;

        if self.session.listening == ListenState::Listening {
            return Ok(());
        }

        self.session.intent = UserIntent::Listening;
        self.session.listening = ListenState::Listening;

        if let Err(e) = engine.start().await {
            self.session = DictationSession::default();
            return Err(e);
        }
        Ok(())
    }

    /// User action: stop dictating.
    ///
    /// The intent flag flips *before* the engine's stop capability is
    /// invoked, so an `End` notification racing this call cannot trigger a
    /// restart.
    pub async fn stop(&mut self) {
        self.session.intent = UserIntent::Stopped;
        self.session.listening = ListenState::Idle;
        if let Some(engine) = self.engine.as_mut() {
            engine.stop().await;
        }
    }

    /// Process one engine notification.
    ///
    /// * Final transcripts are appended to `sink`, each preceded by a single
    ///   separating space; interim results contribute nothing.
    /// * `no-speech` errors are ignored entirely.
    /// * Any other error forces the session idle and is returned for the
    ///   caller to surface.
    /// * `End` restarts the engine when — and only when — the user still
    ///   intends to be listening.
    pub async fn handle_event(
        &mut self,
        event: RecognitionEvent,
        sink: &mut ReportAccumulator,
    ) -> Result<(), DictationError> {
        match event {
            RecognitionEvent::Results(batch) => {
                for result in batch.iter().filter(|r| r.is_final) {
                    sink.append(&format!(" {}", result.transcript));
                }
                Ok(())
            }

            RecognitionEvent::Error(code) if code == NO_SPEECH => {
                log::debug!("no speech detected; keeping the session open");
                Ok(())
            }

            RecognitionEvent::Error(code) => {
                log::warn!("recognition error: {code}");
                self.session.listening = ListenState::Idle;
                self.session.intent = UserIntent::Stopped;
                Err(DictationError::Recognition(code))
            }

            RecognitionEvent::End => {
                if self.session.intent == UserIntent::Listening {
                    log::debug!("engine ended while user intent is listening; restarting");
                    if let Some(engine) = self.engine.as_mut() {
                        engine.start().await?;
                    }
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictation::engine::{MockEngine, RecognitionResult};

    fn controller() -> (
        DictationController<MockEngine>,
        std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>,
    ) {
        let (engine, calls) = MockEngine::new();
        (DictationController::new(engine), calls)
    }

    // ---- start / stop ------------------------------------------------------

    #[tokio::test]
    async fn start_transitions_to_listening_and_starts_engine() {
        let (mut ctl, calls) = controller();
        ctl.start().await.unwrap();

        assert!(ctl.is_listening());
        assert_eq!(ctl.session().intent, UserIntent::Listening);
        assert_eq!(*calls.lock().unwrap(), vec!["start"]);
    }

    #[tokio::test]
    async fn start_while_listening_is_a_noop() {
        let (mut ctl, calls) = controller();
        ctl.start().await.unwrap();
        ctl.start().await.unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["start"]);
    }

    #[tokio::test]
    async fn start_failure_rolls_back_to_idle() {
        let (mut engine, calls) = MockEngine::new();
        engine.fail_start = Some("device busy".into());
        let mut ctl = DictationController::new(engine);

        let err = ctl.start().await.unwrap_err();
        assert!(matches!(err, DictationError::Engine(_)));
        assert!(!ctl.is_listening());
        assert_eq!(ctl.session().intent, UserIntent::Stopped);
        assert_eq!(*calls.lock().unwrap(), vec!["start"]);
    }

    #[tokio::test]
    async fn stop_transitions_to_idle_and_stops_engine() {
        let (mut ctl, calls) = controller();
        ctl.start().await.unwrap();
        ctl.stop().await;

        assert!(!ctl.is_listening());
        assert_eq!(ctl.session().intent, UserIntent::Stopped);
        assert_eq!(*calls.lock().unwrap(), vec!["start", "stop"]);
    }

    #[tokio::test]
    async fn unavailable_controller_surfaces_error_without_state_change() {
        let mut ctl: DictationController<MockEngine> = DictationController::unavailable();
        let err = ctl.start().await.unwrap_err();

        assert!(matches!(err, DictationError::Unavailable));
        assert!(!ctl.is_listening());
        assert_eq!(ctl.session().intent, UserIntent::Stopped);
    }

    // ---- Transcript appends ------------------------------------------------

    #[tokio::test]
    async fn final_transcripts_append_with_separator_and_interims_are_dropped() {
        let (mut ctl, _) = controller();
        let mut sink = ReportAccumulator::new();
        ctl.start().await.unwrap();

        ctl.handle_event(
            RecognitionEvent::Results(vec![
                RecognitionResult::interim("turn", 0.4),
                RecognitionResult::interim("turn on", 0.5),
                RecognitionResult::final_transcript("turn on pump", 0.92),
            ]),
            &mut sink,
        )
        .await
        .unwrap();

        ctl.handle_event(
            RecognitionEvent::Results(vec![
                RecognitionResult::interim("checked", 0.3),
                RecognitionResult::final_transcript("checked scaffold", 0.88),
            ]),
            &mut sink,
        )
        .await
        .unwrap();

        assert_eq!(sink.text(), " turn on pump checked scaffold");
    }

    #[tokio::test]
    async fn batch_with_only_interims_appends_nothing() {
        let (mut ctl, _) = controller();
        let mut sink = ReportAccumulator::new();

        ctl.handle_event(
            RecognitionEvent::Results(vec![RecognitionResult::interim("maybe", 0.2)]),
            &mut sink,
        )
        .await
        .unwrap();

        assert!(sink.is_empty());
    }

    // ---- Error handling ----------------------------------------------------

    #[tokio::test]
    async fn no_speech_is_ignored_and_session_stays_listening() {
        let (mut ctl, calls) = controller();
        let mut sink = ReportAccumulator::new();
        ctl.start().await.unwrap();

        ctl.handle_event(RecognitionEvent::Error(NO_SPEECH.into()), &mut sink)
            .await
            .unwrap();

        assert!(ctl.is_listening());
        // No restart: the session never ended.
        assert_eq!(*calls.lock().unwrap(), vec!["start"]);
    }

    #[tokio::test]
    async fn other_errors_force_idle_and_are_surfaced() {
        let (mut ctl, _) = controller();
        let mut sink = ReportAccumulator::new();
        ctl.start().await.unwrap();

        let err = ctl
            .handle_event(RecognitionEvent::Error("audio-capture".into()), &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, DictationError::Recognition(code) if code == "audio-capture"));
        assert!(!ctl.is_listening());
        assert_eq!(ctl.session().intent, UserIntent::Stopped);
    }

    #[tokio::test]
    async fn end_after_error_does_not_restart() {
        let (mut ctl, calls) = controller();
        let mut sink = ReportAccumulator::new();
        ctl.start().await.unwrap();

        let _ = ctl
            .handle_event(RecognitionEvent::Error("network".into()), &mut sink)
            .await;
        ctl.handle_event(RecognitionEvent::End, &mut sink)
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["start"]);
    }

    // ---- Auto-restart ------------------------------------------------------

    #[tokio::test]
    async fn spontaneous_end_restarts_while_intent_is_listening() {
        let (mut ctl, calls) = controller();
        let mut sink = ReportAccumulator::new();
        ctl.start().await.unwrap();

        ctl.handle_event(RecognitionEvent::End, &mut sink)
            .await
            .unwrap();

        assert!(ctl.is_listening());
        assert_eq!(*calls.lock().unwrap(), vec!["start", "start"]);
    }

    #[tokio::test]
    async fn end_arriving_after_stop_does_not_restart() {
        let (mut ctl, calls) = controller();
        let mut sink = ReportAccumulator::new();
        ctl.start().await.unwrap();
        ctl.stop().await;

        // The engine's termination notification lands after the user stopped.
        ctl.handle_event(RecognitionEvent::End, &mut sink)
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["start", "stop"]);
    }

    #[tokio::test]
    async fn restart_survives_many_spontaneous_ends() {
        let (mut ctl, calls) = controller();
        let mut sink = ReportAccumulator::new();
        ctl.start().await.unwrap();

        for _ in 0..3 {
            ctl.handle_event(RecognitionEvent::End, &mut sink)
                .await
                .unwrap();
        }

        assert!(ctl.is_listening());
        assert_eq!(*calls.lock().unwrap(), vec!["start"; 4]);
    }
}

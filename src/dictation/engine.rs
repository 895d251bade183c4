//! Recognition engine boundary — the capability the dictation controller
//! drives.
//!
//! The engine itself lives outside this crate (a browser speech API, an OS
//! dictation service, a streaming STT backend). This module fixes the
//! contract: two async capabilities ([`start`](RecognitionEngine::start) /
//! [`stop`](RecognitionEngine::stop)) and three notifications the engine
//! delivers back as [`RecognitionEvent`]s, typically over a channel the
//! integration owns.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DictationError
// ---------------------------------------------------------------------------

/// Error code continuous engines emit when the user simply stays silent.
/// Benign — the controller ignores it entirely.
pub const NO_SPEECH: &str = "no-speech";

/// Errors surfaced by the dictation pathway.
#[derive(Debug, Error)]
pub enum DictationError {
    /// No recognition engine is configured on this system. A configuration
    /// condition, not a runtime failure: detected before any state
    /// transition is attempted.
    #[error("speech recognition is not available on this system")]
    Unavailable,

    /// The engine reported a non-benign error code.
    #[error("speech recognition failed: {0}")]
    Recognition(String),

    /// The engine's start capability itself failed.
    #[error("speech recognition could not start: {0}")]
    Engine(String),
}

// ---------------------------------------------------------------------------
// RecognitionEngine
// ---------------------------------------------------------------------------

/// A continuous speech-recognition capability.
///
/// Implementors must be `Send` so the controller can live inside the tokio
/// runtime alongside the ingestion loop. Engines deliver their asynchronous
/// notifications as [`RecognitionEvent`]s which the integration forwards to
/// [`DictationController::handle_event`](super::DictationController::handle_event);
/// this keeps restart/stop ordering testable without a real engine.
#[async_trait]
pub trait RecognitionEngine: Send {
    /// Begin (or resume) continuous capture.
    async fn start(&mut self) -> Result<(), DictationError>;

    /// Stop capture. Engines may still deliver a trailing `End` event after
    /// this returns; the controller's intent flag handles that.
    async fn stop(&mut self);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One recognition hypothesis from the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// Transcribed text for this hypothesis.
    pub transcript: String,
    /// Engine confidence in the range 0.0 – 1.0.
    pub confidence: f32,
    /// `true` once the engine has committed to this transcript. Interim
    /// (in-progress) results are never appended to the report.
    pub is_final: bool,
}

impl RecognitionResult {
    /// Convenience constructor for a committed transcript.
    pub fn final_transcript(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
            is_final: true,
        }
    }

    /// Convenience constructor for an in-progress hypothesis.
    pub fn interim(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
            is_final: false,
        }
    }
}

/// A notification delivered by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// A batch of results, final and interim mixed.
    Results(Vec<RecognitionResult>),
    /// An error code — at minimum [`NO_SPEECH`], plus an open set of others.
    Error(String),
    /// The engine terminated, for any reason including transient ones.
    /// Carries no payload; whether this was user-initiated is known only to
    /// the controller's intent flag.
    End,
}

// ---------------------------------------------------------------------------
// MockEngine (tests)
// ---------------------------------------------------------------------------

/// Scripted engine that records every `start`/`stop` call, so controller
/// tests can assert exactly when restarts happen.
#[cfg(test)]
pub struct MockEngine {
    pub calls: std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>,
    /// When set, the next `start` call fails with this message.
    pub fail_start: Option<String>,
}

#[cfg(test)]
impl MockEngine {
    pub fn new() -> (Self, std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>) {
        let calls = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        (
            Self {
                calls: std::sync::Arc::clone(&calls),
                fail_start: None,
            },
            calls,
        )
    }
}

#[cfg(test)]
#[async_trait]
impl RecognitionEngine for MockEngine {
    async fn start(&mut self) -> Result<(), DictationError> {
        self.calls.lock().unwrap().push("start");
        match self.fail_start.take() {
            Some(message) => Err(DictationError::Engine(message)),
            None => Ok(()),
        }
    }

    async fn stop(&mut self) {
        self.calls.lock().unwrap().push("stop");
    }
}

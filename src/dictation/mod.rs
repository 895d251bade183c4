//! Dictation — continuous speech capture feeding the report accumulator.
//!
//! # Architecture
//!
//! ```text
//! microphone → RecognitionEngine (external) ─┐
//!                                            │ RecognitionEvent
//!                                            ▼
//!                                   DictationController
//!                                            │ final transcripts only
//!                                            ▼
//!                                    ReportAccumulator
//! ```
//!
//! The engine is a trait boundary: this crate ships no concrete
//! implementation (that binding belongs to the embedding frontend), only
//! the controller that makes continuous capture behave like one session —
//! auto-restarting after spurious engine terminations, ignoring benign
//! `no-speech` errors, and never restarting after an explicit user stop.

pub mod controller;
pub mod engine;

pub use controller::{DictationController, DictationSession, ListenState, UserIntent};
pub use engine::{
    DictationError, RecognitionEngine, RecognitionEvent, RecognitionResult, NO_SPEECH,
};

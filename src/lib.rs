//! Site Reporter — streaming ingestion and incremental-report engine.
//!
//! Submits a site narrative (or a safety document) to a remote analysis
//! server and builds a markdown report incrementally as the server streams
//! partial results in a `data: <json>\n\n` push format.
//!
//! # Architecture
//!
//! ```text
//! network stream → stream::FrameDecoder → event::classify
//!               → report::ReportAccumulator → (external renderer/exporter)
//!
//! microphone → dictation::RecognitionEngine (external)
//!           → dictation::DictationController → ReportAccumulator
//! ```
//!
//! The two pathways are independent and interleave in wall-clock arrival
//! order; they share only the accumulator's append contract.

pub mod config;
pub mod dictation;
pub mod event;
pub mod report;
pub mod stream;

pub use config::AppConfig;
pub use dictation::{DictationController, RecognitionEngine};
pub use event::Pipeline;
pub use report::{DocumentObserver, ReportAccumulator};
pub use stream::{FrameDecoder, ReportClient, ReportSubmission, TransportError};

//! Streaming ingestion — network submission and incremental decoding.
//!
//! # Data flow
//!
//! ```text
//! HTTP response chunks → FrameDecoder → payload strings
//!                      → event::classify → fragments
//!                      → ReportAccumulator
//! ```
//!
//! [`FrameDecoder`] is the only stateful piece; classification is pure and
//! the accumulator is append-only, so ordering follows stream order end to
//! end.

pub mod client;
pub mod frame;

pub use client::{ReportClient, ReportSubmission, TransportError};
pub use frame::FrameDecoder;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

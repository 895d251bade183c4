//! Submission client — POSTs a submission and streams the server's partial
//! results into the report accumulator.
//!
//! The response body is the `data: <json>\n\n` push format decoded by
//! [`FrameDecoder`]; each completed frame is classified per the pipeline's
//! key table and appended as a fragment. Decode failures are local (logged,
//! frame skipped); transport failures are terminal and leave the partial
//! document intact.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::config::ServerConfig;
use crate::event::{classify, Pipeline};
use crate::report::ReportAccumulator;

use super::frame::FrameDecoder;

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// Terminal errors of the ingestion transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP connection or mid-stream read failure.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status; nothing was decoded.
    #[error("server returned status {0}")]
    Status(u16),

    /// A previous submission is still streaming. New submissions are
    /// rejected rather than queued.
    #[error("a submission is already streaming")]
    Busy,

    /// The attachment could not be read from disk.
    #[error("failed to read attachment {path}: {source}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ReportSubmission
// ---------------------------------------------------------------------------

/// Input to the reporting pipeline: the narrative plus an optional photo or
/// PDF attachment.
#[derive(Debug, Clone, Default)]
pub struct ReportSubmission {
    /// The typed or dictated narrative.
    pub report_text: String,
    /// Optional attachment path (image or PDF); read at submit time.
    pub attachment: Option<std::path::PathBuf>,
}

// ---------------------------------------------------------------------------
// ReportClient
// ---------------------------------------------------------------------------

/// HTTP client for the analysis server.
///
/// Holds one live submission at a time: the in-flight flag closes the
/// unguarded-resubmission gap by rejecting overlapping calls with
/// [`TransportError::Busy`]. The flag is atomic so the client can sit
/// behind an `Arc` shared with a UI.
pub struct ReportClient {
    http: reqwest::Client,
    config: ServerConfig,
    in_flight: AtomicBool,
}

impl ReportClient {
    /// Build a client from server config.
    ///
    /// Only the connect phase is bounded by the configured timeout; the
    /// streaming body may legitimately take minutes, so no overall request
    /// deadline is set.
    pub fn from_config(config: &ServerConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            config: config.clone(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submit a daily report and stream fragments into `sink`.
    pub async fn submit_report(
        &self,
        submission: &ReportSubmission,
        sink: &mut ReportAccumulator,
    ) -> Result<(), TransportError> {
        let mut form = Form::new().text("report_text", submission.report_text.clone());
        if let Some(path) = &submission.attachment {
            form = form.part("file", file_part(path)?);
        }
        self.stream_into(Pipeline::Reporting, form, sink).await
    }

    /// Submit a safety document for audit and stream fragments into `sink`.
    pub async fn submit_audit(
        &self,
        document: &Path,
        sink: &mut ReportAccumulator,
    ) -> Result<(), TransportError> {
        let form = Form::new().part("file", file_part(document)?);
        self.stream_into(Pipeline::Audit, form, sink).await
    }

    // ── Internal ─────────────────────────────────────────────────────────

    /// Acquire the in-flight guard, run the submission, release the guard.
    async fn stream_into(
        &self,
        pipeline: Pipeline,
        form: Form,
        sink: &mut ReportAccumulator,
    ) -> Result<(), TransportError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TransportError::Busy);
        }

        let result = self.run_stream(pipeline, form, sink).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    /// POST the form and drive decoder → classifier → accumulator until the
    /// transport completes or fails.
    async fn run_stream(
        &self,
        pipeline: Pipeline,
        form: Form,
        sink: &mut ReportAccumulator,
    ) -> Result<(), TransportError> {
        let url = format!("{}{}", self.config.base_url, pipeline.endpoint());
        log::info!("submitting to {url}");

        let mut response = self.http.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        // One accumulator reset per submission, before the first append.
        sink.reset();
        let mut decoder = FrameDecoder::new();

        while let Some(chunk) = response.chunk().await? {
            for payload in decoder.ingest(&chunk) {
                match classify(pipeline, &payload) {
                    Ok(Some(fragment)) => sink.append(&fragment),
                    Ok(None) => log::debug!("ignoring unrecognized event"),
                    Err(e) => log::warn!("skipping malformed event: {e}"),
                }
            }
        }

        if !decoder.is_empty() {
            log::debug!(
                "stream ended with {} bytes of trailing partial data",
                decoder.buffered()
            );
        }

        log::info!("stream complete ({} bytes accumulated)", sink.len());
        Ok(())
    }
}

/// Read an attachment into a multipart part, keeping its file name.
fn file_part(path: &Path) -> Result<Part, TransportError> {
    let bytes = std::fs::read(path).map_err(|source| TransportError::Attachment {
        path: path.display().to_string(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(Part::bytes(bytes).file_name(file_name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

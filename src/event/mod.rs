//! Event classification — decoded JSON payloads → formatted report fragments.
//!
//! Each frame payload is a JSON object carrying exactly one recognized
//! top-level key that names the analysis step which produced it. Two
//! pipelines exist, each with its own key table and its own policy for
//! unrecognized keys:
//!
//! | Pipeline | Keys | Unknown key |
//! |----------|------|-------------|
//! | Reporting | `analyze`, `summarize`, `estimate` | dropped silently |
//! | Audit | `analyze`, `retrieve`, `audit`, `edit` | pretty-printed raw JSON |
//!
//! The asymmetry between the two fallback policies is deliberate and must
//! not be unified — see DESIGN.md.
//!
//! Classification is pure: [`classify`] never touches the accumulator;
//! callers append the returned fragment.

pub mod audit;
pub mod reporting;

pub use audit::AuditEvent;
pub use reporting::ReportingEvent;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Which analysis pipeline a submission is streaming from.
///
/// Selects the endpoint, the recognized key table, and the unknown-key
/// fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Daily site report: `/reporting`.
    Reporting,
    /// Safety document audit: `/audit`.
    Audit,
}

impl Pipeline {
    /// URL path of the submission endpoint, relative to the server base.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Pipeline::Reporting => "/reporting",
            Pipeline::Audit => "/audit",
        }
    }
}

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// A syntactically complete frame whose payload failed validation.
///
/// Local to the offending frame: the caller logs it and continues with the
/// next frame; buffer state is never disturbed.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not a valid JSON document.
    #[error("event payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload carries a recognized key but the expected sub-fields are
    /// missing or have the wrong shape.
    #[error("event `{key}` has an unexpected shape: {source}")]
    Shape {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// Decode one frame payload and render it as a markdown fragment.
///
/// Returns `Ok(None)` when the pipeline's policy is to drop the event
/// (reporting pipeline, unrecognized key). Malformed payloads yield a
/// [`DecodeError`] and no fragment.
pub fn classify(pipeline: Pipeline, payload: &str) -> Result<Option<String>, DecodeError> {
    match pipeline {
        Pipeline::Reporting => Ok(ReportingEvent::decode(payload)?.fragment()),
        Pipeline::Audit => Ok(Some(AuditEvent::decode(payload)?.fragment())),
    }
}

/// Shared fragment template: a level-3 heading, the content, a blank line.
pub(crate) fn fragment(heading: &str, body: &str) -> String {
    format!("### {heading}\n{body}\n\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_server_routes() {
        assert_eq!(Pipeline::Reporting.endpoint(), "/reporting");
        assert_eq!(Pipeline::Audit.endpoint(), "/audit");
    }

    #[test]
    fn classify_reporting_summarize() {
        let fragment = classify(
            Pipeline::Reporting,
            r#"{"summarize":{"summary":"Progress on schedule"}}"#,
        )
        .unwrap();
        assert_eq!(
            fragment.as_deref(),
            Some("### Daily Summary\nProgress on schedule\n\n")
        );
    }

    #[test]
    fn classify_reporting_unknown_is_silent() {
        let fragment = classify(Pipeline::Reporting, r#"{"retrieve":{"x":1}}"#).unwrap();
        assert!(fragment.is_none());
    }

    #[test]
    fn classify_audit_unknown_is_rendered() {
        let fragment = classify(Pipeline::Audit, r#"{"mystery":{"x":1}}"#).unwrap();
        assert!(fragment.is_some());
    }

    #[test]
    fn classify_rejects_invalid_json() {
        let err = classify(Pipeline::Reporting, "{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn classify_rejects_recognized_key_with_bad_shape() {
        let err = classify(Pipeline::Reporting, r#"{"summarize":{"summary":42}}"#).unwrap_err();
        match err {
            DecodeError::Shape { key, .. } => assert_eq!(key, "summarize"),
            other => panic!("expected Shape error, got {other:?}"),
        }
    }
}

//! Audit-pipeline events — the safety document audit steps.

use serde::Deserialize;
use serde_json::Value;

use super::{fragment, DecodeError};

// ---------------------------------------------------------------------------
// AuditEvent
// ---------------------------------------------------------------------------

/// One update from the document-audit pipeline, resolved at decode time.
///
/// Same externally tagged wire shape as the reporting pipeline, but with a
/// different key table and a different fallback: an unrecognized event is
/// rendered as pretty-printed raw JSON instead of being dropped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditEvent {
    /// Work activities identified in the document.
    Analyze { activities: Vec<String> },

    /// Regulatory clauses retrieved for those activities. Only the count is
    /// rendered; the clause bodies feed later steps server-side.
    Retrieve { cdm_requirements: Vec<Value> },

    /// Compliance gaps found against the retrieved clauses.
    Audit { gaps: Vec<String> },

    /// The edited final report text.
    Edit { final_report: String },

    /// Any other top-level key; built explicitly by [`decode`](Self::decode).
    #[serde(skip)]
    Unknown(Value),
}

impl AuditEvent {
    const KEYS: [&'static str; 4] = ["analyze", "retrieve", "audit", "edit"];

    /// Decode a frame payload into an audit event.
    pub fn decode(payload: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(payload)?;

        let recognized = value
            .as_object()
            .and_then(|obj| obj.keys().find(|k| Self::KEYS.contains(&k.as_str())))
            .cloned();

        match recognized {
            Some(key) => {
                serde_json::from_value(value).map_err(|source| DecodeError::Shape { key, source })
            }
            None => Ok(Self::Unknown(value)),
        }
    }

    /// Render the event as a markdown fragment.
    ///
    /// Every audit event renders something: unknown shapes fall back to the
    /// raw JSON so nothing the server streams is invisible to the user.
    pub fn fragment(&self) -> String {
        match self {
            Self::Analyze { activities } => fragment(
                "Analysis",
                &format!("- Activities identified: {}", activities.join(", ")),
            ),
            Self::Retrieve { cdm_requirements } => fragment(
                "CDM Requirements Retrieved",
                &format!("Found {} relevant clauses.", cdm_requirements.len()),
            ),
            Self::Audit { gaps } => fragment("Audit Gaps", &gaps.join("\n")),
            Self::Edit { final_report } => fragment("Final Report", final_report),
            Self::Unknown(value) => {
                let raw = serde_json::to_string_pretty(value)
                    .unwrap_or_else(|_| value.to_string());
                format!("{raw}\n\n")
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

    #[test]
    fn analyze_joins_activities_with_commas() {
        let event = AuditEvent::decode(
            r#"{"analyze":{"activities":["scaffolding","roof work"]}}"#,
        )
        .unwrap();
        assert_eq!(
            event.fragment(),
            "### Analysis\n- Activities identified: scaffolding, roof work\n\n"
        );
    }

    #[test]
    fn retrieve_renders_clause_count() {
        let event = AuditEvent::decode(
            r#"{"retrieve":{"cdm_requirements":[{"id":1},{"id":2},{"id":3}]}}"#,
        )
        .unwrap();
        assert_eq!(
            event.fragment(),
            "### CDM Requirements Retrieved\nFound 3 relevant clauses.\n\n"
        );
    }

    #[test]
    fn audit_joins_gaps_with_newlines() {
        let event =
            AuditEvent::decode(r#"{"audit":{"gaps":["no rescue plan","no exclusion zone"]}}"#)
                .unwrap();
        assert_eq!(
            event.fragment(),
            "### Audit Gaps\nno rescue plan\nno exclusion zone\n\n"
        );
    }

    #[test]
    fn edit_renders_final_report_verbatim() {
        let event =
            AuditEvent::decode(r#"{"edit":{"final_report":"All clear.\nSigned off."}}"#).unwrap();
        assert_eq!(event.fragment(), "### Final Report\nAll clear.\nSigned off.\n\n");
    }

    #[test]
    fn unknown_key_falls_back_to_pretty_json() {
        let event = AuditEvent::decode(r#"{"mystery":{"x":1}}"#).unwrap();
        assert!(matches!(event, AuditEvent::Unknown(_)));

        let fragment = event.fragment();
        assert!(fragment.contains("\"mystery\""));
        assert!(fragment.ends_with("\n\n"));
    }

    #[test]
    fn recognized_key_with_bad_shape_is_shape_error() {
        let err = AuditEvent::decode(r#"{"edit":{"final_report":["not","a","string"]}}"#)
            .unwrap_err();
        match err {
            DecodeError::Shape { key, .. } => assert_eq!(key, "edit"),
            other => panic!("expected Shape error, got {other:?}"),
        }
    }

    #[test]
    fn reporting_only_key_is_unknown_here() {
        // `summarize` belongs to the reporting pipeline; the audit pipeline
        // renders it through the raw-JSON fallback rather than dropping it.
        let event = AuditEvent::decode(r#"{"summarize":{"summary":"x"}}"#).unwrap();
        assert!(matches!(event, AuditEvent::Unknown(_)));
        assert!(event.fragment().contains("summarize"));
    }
}

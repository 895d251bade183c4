//! Reporting-pipeline events — the daily site report analysis steps.

use serde::Deserialize;
use serde_json::Value;

use super::{fragment, DecodeError};

// ---------------------------------------------------------------------------
// ReportingEvent
// ---------------------------------------------------------------------------

/// One update from the daily-report pipeline, resolved at decode time.
///
/// The wire shape is externally tagged — `{"summarize": {"summary": "…"}}` —
/// which serde's default enum representation matches directly. Extra fields
/// inside a step's payload are ignored; the server streams whole node state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingEvent {
    /// Issue analysis. The server wraps the generated text in a one-element
    /// list; only the first element is rendered.
    Analyze { issues: Vec<String> },

    /// Narrative summary of the day.
    Summarize { summary: String },

    /// Time and cost impact estimate.
    Estimate { adjustments: String },

    /// Any other top-level key. Never produced by deserialization; built
    /// explicitly by [`decode`](Self::decode).
    #[serde(skip)]
    Unknown(Value),
}

impl ReportingEvent {
    const KEYS: [&'static str; 3] = ["analyze", "summarize", "estimate"];

    /// Decode a frame payload into a reporting event.
    ///
    /// A payload whose top-level key is not in the table becomes
    /// [`Unknown`](Self::Unknown); a recognized key with the wrong payload
    /// shape is a [`DecodeError::Shape`].
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
    /// Unrecognized events produce no fragment — this pipeline drops them
    /// silently. An `analyze` event with an empty `issues` list has nothing
    /// to render and is dropped too.
    pub fn fragment(&self) -> Option<String> {
        match self {
            Self::Analyze { issues } => issues
                .first()
                .map(|first| fragment("Analysis & Issues", first)),
            Self::Summarize { summary } => Some(fragment("Daily Summary", summary)),
            Self::Estimate { adjustments } => {
                Some(fragment("Time & Cost Adjustments", adjustments))
            }
            Self::Unknown(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

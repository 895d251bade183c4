//! Report accumulator — the append-only sink both pathways write into.
//!
//! Network-decoded fragments and final dictation transcripts land here in
//! strict arrival order. The document is monotonic for the life of a
//! submission: there is no rollback, and a transport error mid-stream leaves
//! everything appended so far intact. [`ReportAccumulator::reset`] is called
//! exactly once at the start of each new submission.
//!
//! A passive [`DocumentObserver`] can watch appends — the CLI uses one to
//! print fragments as they arrive; a UI would use it to scroll to the end.

// ---------------------------------------------------------------------------
// DocumentObserver
// ---------------------------------------------------------------------------

/// Passive hook notified after every append.
///
/// Observers must never mutate the document; they receive the fragment that
/// was just appended and the full document text for display purposes.
pub trait DocumentObserver: Send {
    fn appended(&mut self, fragment: &str, document: &str);
}

// ---------------------------------------------------------------------------
// ReportAccumulator
// ---------------------------------------------------------------------------

/// Append-only collector for one submission's report document.
#[derive(Default)]
pub struct ReportAccumulator {
    text: String,
    observer: Option<Box<dyn DocumentObserver>>,
}

impl ReportAccumulator {
    /// Create an empty accumulator with no observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty accumulator that notifies `observer` on each append.
    pub fn with_observer(observer: Box<dyn DocumentObserver>) -> Self {
        Self {
            text: String::new(),
            observer: Some(observer),
        }
    }

    /// Append a fragment to the document and notify the observer.
    ///
    /// Fragments are permanent: there is no way to remove or reorder them.
    pub fn append(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        if let Some(observer) = self.observer.as_mut() {
            observer.appended(fragment, &self.text);
        }
    }

    /// Clear the document for a new submission.
    pub fn reset(&mut self) {
        self.text.clear();
    }

    /// The accumulated document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` when nothing has been appended since the last reset.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length of the accumulated document in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every notification so tests can assert call order and content.
    struct RecordingObserver {
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl DocumentObserver for RecordingObserver {
        fn appended(&mut self, fragment: &str, document: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((fragment.to_string(), document.to_string()));
        }
    }

    #[test]
    fn appends_concatenate_in_call_order() {
        let mut sink = ReportAccumulator::new();
        sink.append("### A\none\n\n");
        sink.append("### B\ntwo\n\n");
        assert_eq!(sink.text(), "### A\none\n\n### B\ntwo\n\n");
    }

    #[test]
    fn reset_clears_the_document() {
        let mut sink = ReportAccumulator::new();
        sink.append("old submission");
        sink.reset();
        assert!(sink.is_empty());
        assert_eq!(sink.len(), 0);

        sink.append("new submission");
        assert_eq!(sink.text(), "new submission");
    }

    #[test]
    fn observer_sees_each_fragment_and_the_growing_document() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut sink = ReportAccumulator::with_observer(Box::new(RecordingObserver {
            calls: Arc::clone(&calls),
        }));

        sink.append("one ");
        sink.append("two");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("one ".to_string(), "one ".to_string()));
        assert_eq!(calls[1], ("two".to_string(), "one two".to_string()));
    }

    #[test]
    fn new_accumulator_is_empty() {
        let sink = ReportAccumulator::new();
        assert!(sink.is_empty());
        assert_eq!(sink.text(), "");
    }
}

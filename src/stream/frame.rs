//! Frame decoder — reassembles arbitrarily chunked stream bytes into
//! complete, delimiter-terminated event payloads.
//!
//! The analysis server pushes a line-oriented format: each event is one line
//! prefixed with `"data: "` carrying a JSON document, and events are
//! separated by a blank line (`\n\n`). The transport delivers this as byte
//! chunks of arbitrary size, so a single [`ingest`](FrameDecoder::ingest)
//! call may complete zero, one, or many frames, and a frame (or even a
//! single UTF-8 code point) may span several chunks.
//!
//! The decoder owns the only buffer in the ingestion path. At any point,
//! the bytes of all previously completed frames (plus their delimiters and
//! any discarded non-data lines) concatenated with the current buffer
//! contents reproduce exactly the bytes received so far.

// ---------------------------------------------------------------------------
// FrameDecoder
// ---------------------------------------------------------------------------

/// Marker every event line must carry; lines without it are discarded.
pub const DATA_PREFIX: &str = "data: ";

/// Frame delimiter — a blank line between events.
const DELIMITER: &[u8] = b"\n\n";

/// Incremental decoder for the server's `data: <json>\n\n` push format.
///
/// Feed it raw transport chunks with [`ingest`](Self::ingest); it returns
/// the payloads (prefix stripped, delimiter removed) of every frame the new
/// bytes completed, in stream order. The unconsumed tail is retained for
/// the next call, so splitting the stream mid-delimiter, mid-prefix or
/// mid-payload never loses, duplicates, or reorders frames.
///
/// The buffer is kept as raw bytes and only converted to UTF-8 once a frame
/// is complete, so chunk boundaries inside multi-byte characters are safe.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and drain every frame it completes.
    ///
    /// Returned strings are the `data: ` payloads in arrival order. Frames
    /// that do not carry the prefix (comments, keep-alives) are discarded
    /// without terminating the scan; frames that are not valid UTF-8 are
    /// logged and skipped.
    pub fn ingest(&mut self, chunk: &[u8]) -> Vec<String> {
        // The delimiter may straddle the previous tail and this chunk, so
        // resume scanning one byte before the old end.
        let mut search = self.buf.len().saturating_sub(1);
        self.buf.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(rel) = find_delimiter(&self.buf[search..]) {
            let end = search + rel;
            let frame: Vec<u8> = self.buf.drain(..end + DELIMITER.len()).collect();
            search = 0;

            match std::str::from_utf8(&frame[..end]) {
                Ok(text) => {
                    if let Some(payload) = text.strip_prefix(DATA_PREFIX) {
                        payloads.push(payload.to_string());
                    } else {
                        log::debug!("discarding {}-byte frame without data prefix", end);
                    }
                }
                Err(e) => {
                    log::warn!("discarding frame with invalid UTF-8: {e}");
                }
            }
        }

        payloads
    }

    /// Number of unconsumed bytes waiting for a delimiter.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` when no partial frame is pending.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Position of the first `\n\n` in `haystack`, if any.
fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(DELIMITER.len())
        .position(|window| window == DELIMITER)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

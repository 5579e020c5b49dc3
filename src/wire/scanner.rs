use crate::foundation::error::{FramewireError, FramewireResult};

/// Opening payload marker.
pub const OPEN_MARKER: &str = "<<<";
/// Closing payload marker.
pub const CLOSE_MARKER: &str = ">>>";

/// Incremental scanner extracting `<<<payload>>>` pairs from a block stream.
///
/// Blocks are pushed in arrival order with [`PayloadScanner::push`]; complete
/// payloads are pulled with [`PayloadScanner::next_payload`] until it returns
/// `None`, at which point the next block may be pushed. The internal buffer
/// always holds exactly the unconsumed suffix of everything pushed so far, so
/// a payload may straddle any number of block boundaries.
///
/// Matching is anchored: after leading whitespace the buffer must begin with
/// the opening marker. The payload match is non-greedy (the first closing
/// marker ends the pair), so adjacent pairs are never absorbed into one
/// payload.
#[derive(Debug, Default)]
pub struct PayloadScanner {
    buffer: String,
}

impl PayloadScanner {
    /// Create a scanner with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one block to the unconsumed buffer.
    pub fn push(&mut self, block: &str) {
        self.buffer.push_str(block);
    }

    /// Extract the next complete payload, if the buffer holds one.
    ///
    /// Returns `None` when more input is needed (or the buffer content can
    /// never match; see [`PayloadScanner::finish`]). Callers should retry
    /// until `None` before pushing the next block so that multiple pairs in a
    /// single block are all extracted in order.
    pub fn next_payload(&mut self) -> Option<String> {
        let ws = self.buffer.len() - self.buffer.trim_start().len();
        let rest = &self.buffer[ws..];
        if !rest.starts_with(OPEN_MARKER) {
            // Either a partial opener that may still complete with more
            // input, or content that can never match the anchored opener.
            // Both stay buffered and surface through finish().
            return None;
        }
        let body = &rest[OPEN_MARKER.len()..];
        let close = body.find(CLOSE_MARKER)?;
        let payload = body[..close].to_string();
        self.buffer = body[close + CLOSE_MARKER.len()..].to_string();
        Some(payload)
    }

    /// Check the buffer after the final (empty) read.
    ///
    /// Any unconsumed non-whitespace content means the input ended inside a
    /// frame (or with garbage that can never match) and is reported as
    /// [`FramewireError::Truncated`] rather than silently dropped.
    pub fn finish(&self) -> FramewireResult<()> {
        let rest = self.buffer.trim();
        if rest.is_empty() {
            return Ok(());
        }
        Err(FramewireError::truncated(format!(
            "input ended with {} unconsumed bytes and no closing marker",
            rest.len()
        )))
    }
}

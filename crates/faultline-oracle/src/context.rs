//! Bounded source context for oracle requests.
//!
//! Each file becomes a `--- FILE: path ---` section holding at most
//! `per_file_bytes` of its text. The whole context stays under
//! `context_bytes`. Cuts always fall on UTF-8 character boundaries.

use faultline_core::OracleConfig;
use tracing::debug;

/// Accumulates file sections under a byte budget.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    per_file_bytes: usize,
    context_bytes: usize,
    buffer: String,
    files: usize,
    skipped: usize,
}

impl ContextBuilder {
    pub fn new(per_file_bytes: usize, context_bytes: usize) -> Self {
        Self {
            per_file_bytes,
            context_bytes,
            buffer: String::new(),
            files: 0,
            skipped: 0,
        }
    }

    pub fn from_config(config: &OracleConfig) -> Self {
        Self::new(config.per_file_bytes, config.context_bytes)
    }

    /// Appends one file. Returns false once the budget is exhausted.
    pub fn push(&mut self, path: &str, content: &str) -> bool {
        let header = format!("\n--- FILE: {} ---\n", path);
        let remaining = self.context_bytes.saturating_sub(self.buffer.len());
        if remaining <= header.len() + 1 {
            self.skipped += 1;
            return false;
        }

        let budget = self.per_file_bytes.min(remaining - header.len() - 1);
        let body = truncate_at_boundary(content, budget);
        if body.len() < content.len() {
            debug!("Truncated {} to {} bytes of context", path, body.len());
        }

        self.buffer.push_str(&header);
        self.buffer.push_str(body);
        self.buffer.push('\n');
        self.files += 1;
        true
    }

    /// Number of files included so far.
    pub fn files(&self) -> usize {
        self.files
    }

    /// Number of files left out for lack of budget.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.files == 0
    }

    pub fn build(self) -> String {
        if self.skipped > 0 {
            debug!(
                "Context budget exhausted: {} files included, {} skipped",
                self.files, self.skipped
            );
        }
        self.buffer
    }
}

/// Longest prefix of `text` no longer than `max` bytes that ends on a
/// character boundary.
pub fn truncate_at_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

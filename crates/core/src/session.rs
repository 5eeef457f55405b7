// Per-user interactive session state
//
// Owned by whoever drives the pipeline (one instance per user session) and
// passed in by `&mut`. Nothing here is global or shared between sessions.

use crate::separator::Separator;

#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Separator chosen for the most recent file. Starts at semicolon.
    pub last_separator: Separator,
    pub files_converted: usize,
    pub files_failed: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Separator a caller should pre-select before the next file is detected
    pub fn default_separator(&self) -> Separator {
        self.last_separator
    }

    pub fn remember(&mut self, separator: Separator) {
        self.last_separator = separator;
    }

    pub fn record_success(&mut self) {
        self.files_converted += 1;
    }

    pub fn record_failure(&mut self) {
        self.files_failed += 1;
    }
}

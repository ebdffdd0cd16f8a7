//! Types for standardized reports to the user about annotation operations.
//!
//! Individual diagnostics (a dropped gene model, a feature that could not be
//! lifted) are logged as they happen. A [`Report`] collects the run-level
//! summary, e.g. how many gene models were filtered out, which the command line
//! tool writes to standard error once the command completes.
//!

/// The [`CommandOutput<U>`] type output is generic over some data output
/// from a command, and a [`Report`] that reports information to the user.
pub struct CommandOutput<U> {
    pub value: U,
    pub report: Report,
}

impl<U> CommandOutput<U> {
    pub fn new(value: U, report: Report) -> Self {
        Self { value, report }
    }
}

/// A type to (semi) standardize reporting to the user.
#[derive(Debug, Default)]
pub struct Report {
    entries: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, message: String) {
        self.entries.push(message)
    }

    /// Add an issue only if `count` is non-zero, e.g. to summarize dropped records.
    pub fn add_count(&mut self, count: usize, message: &str) {
        if count > 0 {
            self.entries.push(format!("{} {}", count, message))
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

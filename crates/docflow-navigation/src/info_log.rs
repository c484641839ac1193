//! Per-resolution diagnostics log
//!
//! Append-only collector attached to one resolution run; the popover's
//! diagnostics view renders it after the fact. Independent of `tracing`,
//! which still receives the same events.

use parking_lot::Mutex;

/// Severity of one log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoLevel {
    Info,
    Warning,
    Error,
}

/// One diagnostics entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub level: InfoLevel,
    pub message: String,
}

/// Append-only diagnostics collector
#[derive(Debug, Default)]
pub struct InfoLog {
    entries: Mutex<Vec<InfoEntry>>,
}

impl InfoLog {
    /// Create an empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn record(&self, level: InfoLevel, message: impl Into<String>) {
        self.entries.lock().push(InfoEntry {
            level,
            message: message.into(),
        });
    }

    /// Snapshot of all entries in append order
    #[must_use]
    pub fn entries(&self) -> Vec<InfoEntry> {
        self.entries.lock().clone()
    }

    /// Whether any entry at `level` was recorded
    #[must_use]
    pub fn has_level(&self, level: InfoLevel) -> bool {
        self.entries.lock().iter().any(|e| e.level == level)
    }
}

/// Record into an optional log without cluttering call sites
pub(crate) fn log_to(log: Option<&InfoLog>, level: InfoLevel, message: impl Into<String>) {
    if let Some(log) = log {
        log.record(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_preserves_append_order() {
        let log = InfoLog::new();
        log.record(InfoLevel::Info, "first");
        log.record(InfoLevel::Error, "second");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert!(log.has_level(InfoLevel::Error));
        assert!(!log.has_level(InfoLevel::Warning));
    }
}

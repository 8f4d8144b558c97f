//! Bounded operator-facing log of session events.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Number of entries the operation log retains.
pub const OPERATION_LOG_CAPACITY: usize = 5;

/// A single human-readable event line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
        }
    }

    /// `HH:MM:SS` in local time
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.formatted_time(), self.message)
    }
}

// ── OperationLog ─────────────────────────────────────────────────────────────

/// Fixed-capacity log that keeps the most recent entries, newest first.
///
/// Appending beyond capacity evicts the oldest entry. This is a display
/// buffer for the operator, not an audit trail.
#[derive(Debug, Clone)]
pub struct OperationLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    total_appended: u64,
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationLog {
    pub fn new() -> Self {
        Self::with_capacity(OPERATION_LOG_CAPACITY)
    }

    /// Custom capacity; zero is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total_appended: 0,
        }
    }

    /// Prepend a timestamped entry, evicting the oldest if at capacity.
    pub fn append(&mut self, message: impl Into<String>) {
        self.push_entry(LogEntry::new(message));
    }

    pub fn push_entry(&mut self, entry: LogEntry) {
        tracing::debug!("oplog: {}", entry.message);
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        self.total_appended += 1;
    }

    /// Iterate newest to oldest.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Owned copy for display, newest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Monotonic count of every entry ever appended, evicted ones included.
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Entries appended after the log had seen `since` appends, newest first.
    pub fn appended_since(&self, since: u64) -> impl Iterator<Item = &LogEntry> {
        let fresh = self.total_appended.saturating_sub(since) as usize;
        self.entries.iter().take(fresh)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

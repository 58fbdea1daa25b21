//! Operator-facing event log.

use std::collections::VecDeque;

use serde::Serialize;

use super::clock::Clock;

/// Severity of a log entry, rendered as the entry colour by hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// One timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Monotonic sequence number, never reused within a session.
    pub seq: u64,
    /// Simulated session second the entry was recorded at.
    pub at_secs: u64,
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    /// `HH:MM:SS` rendering of [`at_secs`](Self::at_secs).
    pub fn time(&self) -> String {
        Clock::hms(self.at_secs)
    }
}

/// Append-only log kept newest-first.
///
/// Only [`clear`](Self::clear) removes entries; sequence numbers keep
/// counting across clears so a reader can tell old entries from new ones.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    next_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends an entry and mirrors it to the developer log.
    pub fn record(&mut self, at_secs: u64, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        tracing::debug!(at_secs, severity = severity.as_str(), "{message}");
        self.entries.push_front(LogEntry {
            seq: self.next_seq,
            at_secs,
            message,
            severity,
        });
        self.next_seq += 1;
    }

    /// Entries newest-first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries oldest-first.
    pub fn chronological(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    /// Entries with a sequence number of at least `seq`, oldest-first.
    pub fn since(&self, seq: u64) -> impl Iterator<Item = &LogEntry> {
        self.chronological().filter(move |e| e.seq >= seq)
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Sequence number the next entry will get.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//! API response and query types.
//!
//! Event field names follow the event-log CSV export columns.

use serde::{Deserialize, Serialize};

use crate::sim::event_log::{LogEntry, Severity};
use crate::sim::snapshot::Snapshot;

/// Drill summary plus the switchboard as it stood at the end.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub drill: String,
    pub duration_secs: u64,
    pub accepted_commands: usize,
    pub rejected_commands: usize,
    pub backfeed_violations: usize,
    pub snapshot: Snapshot,
}

/// Single event-log record using the CSV column names.
#[derive(Debug, Serialize)]
pub struct EventRecord {
    pub at_secs: u64,
    /// `HH:MM:SS` rendering of `at_secs`.
    pub time: String,
    pub severity: Severity,
    pub message: String,
}

impl From<&LogEntry> for EventRecord {
    fn from(e: &LogEntry) -> Self {
        Self {
            at_secs: e.at_secs,
            time: e.time(),
            severity: e.severity,
            message: e.message.clone(),
        }
    }
}

/// Optional simulated-second range, both ends inclusive.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

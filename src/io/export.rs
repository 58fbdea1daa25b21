//! CSV export for drill event logs and switchboard timelines.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::drill::TimelineRow;
use crate::sim::event_log::LogEntry;

/// Column header for the event-log export.
pub const EVENTS_HEADER: &str = "at_secs,time,severity,message";

/// Column header for the timeline export.
pub const TIMELINE_HEADER: &str =
    "at_secs,simulating,eb1,eb2,dg1,dg2,bc1,bc2,lt1_source,lt2_source";

/// Exports event-log entries to a CSV file at the given path.
///
/// Entries are written in the order given; pass them oldest-first.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_events_csv(entries: &[LogEntry], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_events_csv(entries, io::BufWriter::new(file))
}

/// Writes event-log entries as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_events_csv(entries: &[LogEntry], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(EVENTS_HEADER.split(','))?;

    for e in entries {
        wtr.write_record([
            e.at_secs.to_string(),
            e.time(),
            e.severity.as_str().to_string(),
            e.message.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a drill timeline to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_timeline_csv(rows: &[TimelineRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_timeline_csv(rows, io::BufWriter::new(file))
}

/// Writes a drill timeline as CSV to any writer, one row per second.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_timeline_csv(rows: &[TimelineRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TIMELINE_HEADER.split(','))?;

    for r in rows {
        wtr.write_record([
            r.at_secs.to_string(),
            r.simulating.to_string(),
            r.eb1.as_str().to_string(),
            r.eb2.as_str().to_string(),
            r.dg1.as_str().to_string(),
            r.dg2.as_str().to_string(),
            r.bc1.as_str().to_string(),
            r.bc2.as_str().to_string(),
            r.lt1_source.clone(),
            r.lt2_source.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::event_log::Severity;
    use crate::sim::state::SwitchState;

    fn entry(seq: u64, message: &str) -> LogEntry {
        LogEntry {
            seq,
            at_secs: seq * 10,
            message: message.to_string(),
            severity: Severity::Success,
        }
    }

    fn row(t: u64) -> TimelineRow {
        TimelineRow {
            at_secs: t,
            simulating: t < 2,
            eb1: SwitchState::TrippedOpen,
            eb2: SwitchState::Closed,
            dg1: SwitchState::Open,
            dg2: SwitchState::Open,
            bc1: SwitchState::Closed,
            bc2: SwitchState::Closed,
            lt1_source: "EB-2 via Bus Coupler".to_string(),
            lt2_source: "EB-2".to_string(),
        }
    }

    #[test]
    fn events_header_and_quoting() {
        let mut buf = Vec::new();
        write_events_csv(&[entry(7, "Bus Coupler-1 CLOSED, LT-1 live")], &mut buf).ok();
        let output = String::from_utf8(buf).unwrap_or_default();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], EVENTS_HEADER);
        assert_eq!(
            lines[1],
            "70,00:01:10,success,\"Bus Coupler-1 CLOSED, LT-1 live\""
        );
    }

    #[test]
    fn timeline_row_count_matches() {
        let rows: Vec<TimelineRow> = (0..5).map(row).collect();
        let mut buf = Vec::new();
        write_timeline_csv(&rows, &mut buf).ok();
        let output = String::from_utf8(buf).unwrap_or_default();
        let lines: Vec<&str> = output.lines().collect();
        // 1 header + 5 data rows
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], TIMELINE_HEADER);
        assert_eq!(
            lines[1],
            "0,true,TRIPPED_OPEN,CLOSED,OPEN,OPEN,CLOSED,CLOSED,EB-2 via Bus Coupler,EB-2"
        );
    }

    #[test]
    fn timeline_parses_back() {
        let rows: Vec<TimelineRow> = (0..3).map(row).collect();
        let mut buf = Vec::new();
        write_timeline_csv(&rows, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(10));

        let simulating: Vec<bool> = rdr
            .records()
            .filter_map(Result::ok)
            .filter_map(|rec| rec[1].parse().ok())
            .collect();
        assert_eq!(simulating, vec![true, true, false]);
    }
}

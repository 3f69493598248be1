//! Consumers of the record stream.

use crate::record::{EventRecord, SessionSummary};

/// Receives records from [`Fleet::run`][crate::Fleet::run] one at a time.
///
/// All methods have default no-op implementations.  A sink owns batching,
/// persistence and retries; the fleet hands each record over exactly once
/// and keeps no copy.
pub trait EventSink {
    /// Called once per emitted record, in ascending vehicle id order within
    /// each fleet tick.
    fn on_record(&mut self, _record: EventRecord) {}

    /// Called right after a session's final record.
    fn on_session_end(&mut self, _summary: &SessionSummary) {}

    /// Called once after every session has completed.
    fn on_run_end(&mut self) {}
}

/// An [`EventSink`] that drops everything.
pub struct NoopSink;

impl EventSink for NoopSink {}

/// Collects records and summaries in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub records:   Vec<EventRecord>,
    pub summaries: Vec<SessionSummary>,
    pub finished:  bool,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for VecSink {
    fn on_record(&mut self, record: EventRecord) {
        self.records.push(record);
    }

    fn on_session_end(&mut self, summary: &SessionSummary) {
        self.summaries.push(summary.clone());
    }

    fn on_run_end(&mut self) {
        self.finished = true;
    }
}

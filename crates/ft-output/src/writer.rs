//! The `OutputWriter` trait implemented by all backend writers.

use crate::{EventRow, OutputResult, SessionSummaryRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// Errors surface to [`SinkWriter`][crate::SinkWriter], which keeps the
/// first one for [`take_error`][crate::SinkWriter::take_error].
pub trait OutputWriter {
    /// Write a batch of event rows.
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    /// Write one session summary row.
    fn write_session_summary(&mut self, row: &SessionSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}

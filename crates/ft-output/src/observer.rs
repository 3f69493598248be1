//! `SinkWriter<W>` — bridges `EventSink` to an `OutputWriter`.

use ft_sim::{EventRecord, EventSink, SessionSummary};

use crate::row::{EventRow, SessionSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Records buffered before a write, unless overridden.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// An [`EventSink`] that batches records into any [`OutputWriter`] backend
/// (CSV, SQLite, Parquet, …).
///
/// `EventSink` methods have no return value, so write errors are stored.
/// Only the first error is kept; later records are still offered to the
/// writer.  After `fleet.run()` returns, check with
/// [`take_error`][Self::take_error].
pub struct SinkWriter<W: OutputWriter> {
    writer:     W,
    batch:      Vec<EventRow>,
    batch_size: usize,
    written:    u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SinkWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_batch_size(writer, DEFAULT_BATCH_SIZE)
    }

    /// A `batch_size` of 0 is treated as 1.
    pub fn with_batch_size(writer: W, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            writer,
            batch: Vec::with_capacity(batch_size),
            batch_size,
            written: 0,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `fleet.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Event rows handed to the writer so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Write out any buffered rows now.
    pub fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        let result = self.writer.write_events(&self.batch);
        if result.is_ok() {
            self.written += self.batch.len() as u64;
        }
        self.batch.clear();
        self.store_err(result);
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                log::error!("output write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> EventSink for SinkWriter<W> {
    fn on_record(&mut self, record: EventRecord) {
        self.batch.push(EventRow::from(&record));
        if self.batch.len() >= self.batch_size {
            self.flush();
        }
    }

    fn on_session_end(&mut self, summary: &SessionSummary) {
        let result = self.writer.write_session_summary(&SessionSummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_run_end(&mut self) {
        self.flush();
        let result = self.writer.finish();
        self.store_err(result);
        log::debug!("output finished: {} event rows written", self.written);
    }
}

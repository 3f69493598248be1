//! `ft-output` — persistence backends for generated fleet records.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend     | Files created                          |
//! |-----------|-------------|----------------------------------------|
//! | *(none)*  | CSV         | `events.csv`, `sessions.csv`           |
//! | `sqlite`  | SQLite      | `output.db`                            |
//! | `parquet` | Parquet     | `events.parquet`, `sessions.parquet`   |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SinkWriter`], which implements `ft_sim::EventSink`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ft_output::{CsvWriter, SinkWriter};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut sink = SinkWriter::new(writer);
//! fleet.run(&mut sink)?;
//! if let Some(e) = sink.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{SinkWriter, DEFAULT_BATCH_SIZE};
pub use row::{EventRow, SessionSummaryRow, EVENT_COLUMNS, SESSION_COLUMNS};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;

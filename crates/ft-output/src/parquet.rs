//! Parquet output backend (feature `parquet`).
//!
//! Creates two files in the configured output directory:
//! - `events.parquet`
//! - `sessions.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder, UInt64Builder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputError, OutputResult, SessionSummaryRow};

fn event_schema() -> Arc<Schema> {
    use DataType::{Boolean, Float64, Int64, UInt64, Utf8};
    Arc::new(Schema::new(vec![
        Field::new("timestamp_unix",         Int64,   false),
        Field::new("tick",                   UInt64,  false),
        Field::new("vehicle_id",             Utf8,    false),
        Field::new("driver_id",              Utf8,    false),
        Field::new("lat",                    Float64, false),
        Field::new("lon",                    Float64, false),
        Field::new("odometer_km",            Float64, false),
        Field::new("speed_kmh",              Float64, false),
        Field::new("route_state",            Utf8,    false),
        Field::new("road_type",              Utf8,    false),
        Field::new("time_of_day",            Utf8,    false),
        Field::new("weather",                Utf8,    false),
        Field::new("speed_deviation_kmh",    Float64, false),
        Field::new("acceleration_intensity", Float64, false),
        Field::new("braking_intensity",      Float64, false),
        Field::new("steering_smoothness",    Float64, false),
        Field::new("reaction_time_ms",       Float64, false),
        Field::new("lane_keeping",           Float64, false),
        Field::new("engine_temp",            Float64, true),
        Field::new("coolant_temp",           Float64, true),
        Field::new("oil_pressure",           Float64, true),
        Field::new("rpm",                    Float64, false),
        Field::new("throttle_pct",           Float64, false),
        Field::new("fuel_rate_lph",          Float64, false),
        Field::new("fuel_level_pct",         Float64, false),
        Field::new("incident_count",         UInt64,  false),
        Field::new("incidents",              Utf8,    false),
        Field::new("speed_clamped",          Boolean, false),
        Field::new("lambda_floored",         Boolean, false),
    ]))
}

fn session_schema() -> Arc<Schema> {
    use DataType::{Boolean, Float64, UInt64, Utf8};
    Arc::new(Schema::new(vec![
        Field::new("vehicle_id",     Utf8,    false),
        Field::new("driver_id",      Utf8,    false),
        Field::new("ticks",          UInt64,  false),
        Field::new("delivered",      Boolean, false),
        Field::new("odometer_km",    Float64, false),
        Field::new("incidents",      UInt64,  false),
        Field::new("fuel_used_pct",  Float64, false),
        Field::new("speed_clamped",  UInt64,  false),
        Field::new("lambda_floored", UInt64,  false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// One `Float64` column built from a row accessor.
fn f64_column(rows: &[EventRow], get: impl Fn(&EventRow) -> f64) -> ArrayRef {
    let mut b = Float64Builder::with_capacity(rows.len());
    rows.iter().for_each(|r| b.append_value(get(r)));
    Arc::new(b.finish())
}

fn opt_f64_column(rows: &[EventRow], get: impl Fn(&EventRow) -> Option<f64>) -> ArrayRef {
    let mut b = Float64Builder::with_capacity(rows.len());
    rows.iter().for_each(|r| b.append_option(get(r)));
    Arc::new(b.finish())
}

fn str_column<'a>(rows: &'a [EventRow], get: impl Fn(&'a EventRow) -> &'a str) -> ArrayRef {
    let mut b = StringBuilder::new();
    rows.iter().for_each(|r| b.append_value(get(r)));
    Arc::new(b.finish())
}

fn bool_column(rows: &[EventRow], get: impl Fn(&EventRow) -> bool) -> ArrayRef {
    let mut b = BooleanBuilder::with_capacity(rows.len());
    rows.iter().for_each(|r| b.append_value(get(r)));
    Arc::new(b.finish())
}

fn u64_column(rows: &[EventRow], get: impl Fn(&EventRow) -> u64) -> ArrayRef {
    let mut b = UInt64Builder::with_capacity(rows.len());
    rows.iter().for_each(|r| b.append_value(get(r)));
    Arc::new(b.finish())
}

/// Writes records and session summaries to two Parquet files.
///
/// Each `write_events` call becomes one row group batch.  Session summaries
/// are buffered and written as a single batch by `finish()`.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    events:         Option<ArrowWriter<File>>,
    sessions:       Option<ArrowWriter<File>>,
    event_schema:   Arc<Schema>,
    session_schema: Arc<Schema>,
    pending:        Vec<SessionSummaryRow>,
}

impl ParquetWriter {
    /// Create both Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let event_schema = event_schema();
        let session_schema = session_schema();

        let events = ArrowWriter::try_new(
            File::create(dir.join("events.parquet"))?,
            Arc::clone(&event_schema),
            Some(snappy_props()),
        )?;
        let sessions = ArrowWriter::try_new(
            File::create(dir.join("sessions.parquet"))?,
            Arc::clone(&session_schema),
            Some(snappy_props()),
        )?;

        Ok(Self {
            events: Some(events),
            sessions: Some(sessions),
            event_schema,
            session_schema,
            pending: Vec::new(),
        })
    }

    fn session_batch(&self) -> OutputResult<RecordBatch> {
        let rows = &self.pending;
        let mut vehicle = StringBuilder::new();
        let mut driver = StringBuilder::new();
        let mut ticks = UInt64Builder::with_capacity(rows.len());
        let mut delivered = BooleanBuilder::with_capacity(rows.len());
        let mut odometer = Float64Builder::with_capacity(rows.len());
        let mut incidents = UInt64Builder::with_capacity(rows.len());
        let mut fuel = Float64Builder::with_capacity(rows.len());
        let mut clamped = UInt64Builder::with_capacity(rows.len());
        let mut floored = UInt64Builder::with_capacity(rows.len());

        for row in rows {
            vehicle.append_value(&row.vehicle_id);
            driver.append_value(&row.driver_id);
            ticks.append_value(row.ticks);
            delivered.append_value(row.delivered);
            odometer.append_value(row.odometer_km);
            incidents.append_value(row.incidents);
            fuel.append_value(row.fuel_used_pct);
            clamped.append_value(row.speed_clamped);
            floored.append_value(row.lambda_floored);
        }

        Ok(RecordBatch::try_new(
            Arc::clone(&self.session_schema),
            vec![
                Arc::new(vehicle.finish()),
                Arc::new(driver.finish()),
                Arc::new(ticks.finish()),
                Arc::new(delivered.finish()),
                Arc::new(odometer.finish()),
                Arc::new(incidents.finish()),
                Arc::new(fuel.finish()),
                Arc::new(clamped.finish()),
                Arc::new(floored.finish()),
            ],
        )?)
    }
}

impl OutputWriter for ParquetWriter {
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        let Some(writer) = self.events.as_mut() else {
            return Err(OutputError::Finished);
        };
        if rows.is_empty() {
            return Ok(());
        }

        let mut timestamps = Int64Builder::with_capacity(rows.len());
        rows.iter().for_each(|r| timestamps.append_value(r.timestamp_unix));

        let batch = RecordBatch::try_new(
            Arc::clone(&self.event_schema),
            vec![
                Arc::new(timestamps.finish()),
                u64_column(rows, |r| r.tick),
                str_column(rows, |r| r.vehicle_id.as_str()),
                str_column(rows, |r| r.driver_id.as_str()),
                f64_column(rows, |r| r.lat),
                f64_column(rows, |r| r.lon),
                f64_column(rows, |r| r.odometer_km),
                f64_column(rows, |r| r.speed_kmh),
                str_column(rows, |r| r.route_state),
                str_column(rows, |r| r.road_type),
                str_column(rows, |r| r.time_of_day),
                str_column(rows, |r| r.weather),
                f64_column(rows, |r| r.speed_deviation_kmh),
                f64_column(rows, |r| r.acceleration_intensity),
                f64_column(rows, |r| r.braking_intensity),
                f64_column(rows, |r| r.steering_smoothness),
                f64_column(rows, |r| r.reaction_time_ms),
                f64_column(rows, |r| r.lane_keeping),
                opt_f64_column(rows, |r| r.engine_temp),
                opt_f64_column(rows, |r| r.coolant_temp),
                opt_f64_column(rows, |r| r.oil_pressure),
                f64_column(rows, |r| r.rpm),
                f64_column(rows, |r| r.throttle_pct),
                f64_column(rows, |r| r.fuel_rate_lph),
                f64_column(rows, |r| r.fuel_level_pct),
                u64_column(rows, |r| r.incident_count),
                str_column(rows, |r| r.incidents.as_str()),
                bool_column(rows, |r| r.speed_clamped),
                bool_column(rows, |r| r.lambda_floored),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_session_summary(&mut self, row: &SessionSummaryRow) -> OutputResult<()> {
        if self.sessions.is_none() {
            return Err(OutputError::Finished);
        }
        self.pending.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.events.take() {
            w.close()?;
        }
        if let Some(mut w) = self.sessions.take() {
            if !self.pending.is_empty() {
                w.write(&self.session_batch()?)?;
                self.pending.clear();
            }
            w.close()?;
        }
        Ok(())
    }
}

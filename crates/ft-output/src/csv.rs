//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `events.csv`
//! - `sessions.csv`
//!
//! Booleans are written as `0`/`1`; absent telemetry channels as empty
//! fields.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::row::{EVENT_COLUMNS, SESSION_COLUMNS};
use crate::writer::OutputWriter;
use crate::{EventRow, OutputError, OutputResult, SessionSummaryRow};

/// Writes records and session summaries to two CSV files.
pub struct CsvWriter {
    events:   Writer<File>,
    sessions: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create (or truncate) the two CSV files in `dir` and write the header
    /// rows.  `dir` is created if missing.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut events = Writer::from_path(dir.join("events.csv"))?;
        events.write_record(EVENT_COLUMNS)?;

        let mut sessions = Writer::from_path(dir.join("sessions.csv"))?;
        sessions.write_record(SESSION_COLUMNS)?;

        Ok(Self {
            events,
            sessions,
            finished: false,
        })
    }
}

fn opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn flag(b: bool) -> String {
    (b as u8).to_string()
}

impl OutputWriter for CsvWriter {
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished);
        }
        for row in rows {
            self.events.write_record(&[
                row.timestamp_unix.to_string(),
                row.tick.to_string(),
                row.vehicle_id.clone(),
                row.driver_id.clone(),
                row.lat.to_string(),
                row.lon.to_string(),
                row.odometer_km.to_string(),
                row.speed_kmh.to_string(),
                row.route_state.to_owned(),
                row.road_type.to_owned(),
                row.time_of_day.to_owned(),
                row.weather.to_owned(),
                row.speed_deviation_kmh.to_string(),
                row.acceleration_intensity.to_string(),
                row.braking_intensity.to_string(),
                row.steering_smoothness.to_string(),
                row.reaction_time_ms.to_string(),
                row.lane_keeping.to_string(),
                opt(row.engine_temp),
                opt(row.coolant_temp),
                opt(row.oil_pressure),
                row.rpm.to_string(),
                row.throttle_pct.to_string(),
                row.fuel_rate_lph.to_string(),
                row.fuel_level_pct.to_string(),
                row.incident_count.to_string(),
                row.incidents.clone(),
                flag(row.speed_clamped),
                flag(row.lambda_floored),
            ])?;
        }
        Ok(())
    }

    fn write_session_summary(&mut self, row: &SessionSummaryRow) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished);
        }
        self.sessions.write_record(&[
            row.vehicle_id.clone(),
            row.driver_id.clone(),
            row.ticks.to_string(),
            flag(row.delivered),
            row.odometer_km.to_string(),
            row.incidents.to_string(),
            row.fuel_used_pct.to_string(),
            row.speed_clamped.to_string(),
            row.lambda_floored.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.sessions.flush()?;
        Ok(())
    }
}

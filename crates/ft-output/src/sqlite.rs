//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `events` and `sessions`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputError, OutputResult, SessionSummaryRow};

/// Writes records and session summaries to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS events (
                 timestamp_unix         INTEGER NOT NULL,
                 tick                   INTEGER NOT NULL,
                 vehicle_id             TEXT    NOT NULL,
                 driver_id              TEXT    NOT NULL,
                 lat                    REAL    NOT NULL,
                 lon                    REAL    NOT NULL,
                 odometer_km            REAL    NOT NULL,
                 speed_kmh              REAL    NOT NULL,
                 route_state            TEXT    NOT NULL,
                 road_type              TEXT    NOT NULL,
                 time_of_day            TEXT    NOT NULL,
                 weather                TEXT    NOT NULL,
                 speed_deviation_kmh    REAL    NOT NULL,
                 acceleration_intensity REAL    NOT NULL,
                 braking_intensity      REAL    NOT NULL,
                 steering_smoothness    REAL    NOT NULL,
                 reaction_time_ms       REAL    NOT NULL,
                 lane_keeping           REAL    NOT NULL,
                 engine_temp            REAL,
                 coolant_temp           REAL,
                 oil_pressure           REAL,
                 rpm                    REAL    NOT NULL,
                 throttle_pct           REAL    NOT NULL,
                 fuel_rate_lph          REAL    NOT NULL,
                 fuel_level_pct         REAL    NOT NULL,
                 incident_count         INTEGER NOT NULL,
                 incidents              TEXT    NOT NULL,
                 speed_clamped          INTEGER NOT NULL,
                 lambda_floored         INTEGER NOT NULL,
                 PRIMARY KEY (vehicle_id, tick)
             );
             CREATE TABLE IF NOT EXISTS sessions (
                 vehicle_id     TEXT PRIMARY KEY,
                 driver_id      TEXT    NOT NULL,
                 ticks          INTEGER NOT NULL,
                 delivered      INTEGER NOT NULL,
                 odometer_km    REAL    NOT NULL,
                 incidents      INTEGER NOT NULL,
                 fuel_used_pct  REAL    NOT NULL,
                 speed_clamped  INTEGER NOT NULL,
                 lambda_floored INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished);
        }
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO events VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                  ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.timestamp_unix,
                    row.tick as i64,
                    row.vehicle_id,
                    row.driver_id,
                    row.lat,
                    row.lon,
                    row.odometer_km,
                    row.speed_kmh,
                    row.route_state,
                    row.road_type,
                    row.time_of_day,
                    row.weather,
                    row.speed_deviation_kmh,
                    row.acceleration_intensity,
                    row.braking_intensity,
                    row.steering_smoothness,
                    row.reaction_time_ms,
                    row.lane_keeping,
                    row.engine_temp,
                    row.coolant_temp,
                    row.oil_pressure,
                    row.rpm,
                    row.throttle_pct,
                    row.fuel_rate_lph,
                    row.fuel_level_pct,
                    row.incident_count as i64,
                    row.incidents,
                    row.speed_clamped as i64,
                    row.lambda_floored as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_session_summary(&mut self, row: &SessionSummaryRow) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished);
        }
        self.conn.execute(
            "INSERT INTO sessions VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                row.vehicle_id,
                row.driver_id,
                row.ticks as i64,
                row.delivered as i64,
                row.odometer_km,
                row.incidents as i64,
                row.fuel_used_pct,
                row.speed_clamped as i64,
                row.lambda_floored as i64,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

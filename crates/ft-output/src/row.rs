//! Flat row types written by output backends.
//!
//! Rows hold owned, column-ready values so every backend writes the same
//! table shape.  Telemetry channels missing from the generator config are
//! `None` and written as empty / NULL.

use ft_models::{Channel, MarkovState};
use ft_sim::{EventRecord, SessionSummary};

/// Column names of the events table, in write order.
pub const EVENT_COLUMNS: [&str; 29] = [
    "timestamp_unix",
    "tick",
    "vehicle_id",
    "driver_id",
    "lat",
    "lon",
    "odometer_km",
    "speed_kmh",
    "route_state",
    "road_type",
    "time_of_day",
    "weather",
    "speed_deviation_kmh",
    "acceleration_intensity",
    "braking_intensity",
    "steering_smoothness",
    "reaction_time_ms",
    "lane_keeping",
    "engine_temp",
    "coolant_temp",
    "oil_pressure",
    "rpm",
    "throttle_pct",
    "fuel_rate_lph",
    "fuel_level_pct",
    "incident_count",
    "incidents",
    "speed_clamped",
    "lambda_floored",
];

/// Column names of the sessions table, in write order.
pub const SESSION_COLUMNS: [&str; 9] = [
    "vehicle_id",
    "driver_id",
    "ticks",
    "delivered",
    "odometer_km",
    "incidents",
    "fuel_used_pct",
    "speed_clamped",
    "lambda_floored",
];

/// One emitted record, flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub timestamp_unix:         i64,
    pub tick:                   u64,
    pub vehicle_id:             String,
    pub driver_id:              String,
    pub lat:                    f64,
    pub lon:                    f64,
    pub odometer_km:            f64,
    pub speed_kmh:              f64,
    pub route_state:            &'static str,
    pub road_type:              &'static str,
    pub time_of_day:            &'static str,
    pub weather:                &'static str,
    pub speed_deviation_kmh:    f64,
    pub acceleration_intensity: f64,
    pub braking_intensity:      f64,
    pub steering_smoothness:    f64,
    pub reaction_time_ms:       f64,
    pub lane_keeping:           f64,
    pub engine_temp:            Option<f64>,
    pub coolant_temp:           Option<f64>,
    pub oil_pressure:           Option<f64>,
    pub rpm:                    f64,
    pub throttle_pct:           f64,
    pub fuel_rate_lph:          f64,
    pub fuel_level_pct:         f64,
    pub incident_count:         u64,
    /// `kind:severity` pairs joined by `;`.  Empty when no incident.
    pub incidents:              String,
    pub speed_clamped:          bool,
    pub lambda_floored:         bool,
}

impl From<&EventRecord> for EventRow {
    fn from(r: &EventRecord) -> Self {
        let channel = |c: Channel| r.telemetry.get(&c).copied();
        let incidents = r
            .incidents
            .iter()
            .map(|d| format!("{}:{}", d.kind.as_str(), d.severity.as_str()))
            .collect::<Vec<_>>()
            .join(";");

        Self {
            timestamp_unix:         r.timestamp_unix,
            tick:                   r.tick.0,
            vehicle_id:             r.vehicle_id.label(),
            driver_id:              r.driver_id.label(),
            lat:                    r.position.lat,
            lon:                    r.position.lon,
            odometer_km:            r.odometer_km,
            speed_kmh:              r.speed_kmh,
            route_state:            r.route_state.name(),
            road_type:              r.road_type.as_str(),
            time_of_day:            r.time_of_day.as_str(),
            weather:                r.weather.as_str(),
            speed_deviation_kmh:    r.driver.speed_deviation_kmh,
            acceleration_intensity: r.driver.acceleration_intensity,
            braking_intensity:      r.driver.braking_intensity,
            steering_smoothness:    r.driver.steering_smoothness,
            reaction_time_ms:       r.driver.reaction_time_ms,
            lane_keeping:           r.driver.lane_keeping,
            engine_temp:            channel(Channel::EngineTemp),
            coolant_temp:           channel(Channel::CoolantTemp),
            oil_pressure:           channel(Channel::OilPressure),
            rpm:                    r.engine.rpm,
            throttle_pct:           r.engine.throttle_pct,
            fuel_rate_lph:          r.engine.fuel_rate_lph,
            fuel_level_pct:         r.engine.fuel_level_pct,
            incident_count:         r.incident_count,
            incidents,
            speed_clamped:          r.speed_clamped,
            lambda_floored:         r.lambda_floored,
        }
    }
}

/// End-of-session totals for one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummaryRow {
    pub vehicle_id:     String,
    pub driver_id:      String,
    pub ticks:          u64,
    pub delivered:      bool,
    pub odometer_km:    f64,
    pub incidents:      u64,
    pub fuel_used_pct:  f64,
    pub speed_clamped:  u64,
    pub lambda_floored: u64,
}

impl From<&SessionSummary> for SessionSummaryRow {
    fn from(s: &SessionSummary) -> Self {
        Self {
            vehicle_id:     s.vehicle_id.label(),
            driver_id:      s.driver_id.label(),
            ticks:          s.ticks,
            delivered:      s.delivered,
            odometer_km:    s.odometer_km,
            incidents:      s.incidents,
            fuel_used_pct:  s.fuel_used_pct,
            speed_clamped:  s.corrections.speed_clamped,
            lambda_floored: s.corrections.lambda_floored,
        }
    }
}

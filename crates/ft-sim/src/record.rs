//! Emitted records and the per-session correction metric.
//!
//! [`EventRecord`] is the observable projection of a tick: it carries what a
//! real vehicle's sensors could report and nothing else.  The hidden driver
//! state only leaves a session through [`LabelledRecord`], which callers
//! request explicitly.

use ft_core::{DriverId, GeoPoint, Tick, VehicleId};
use ft_models::{
    DriverObservation, DriverState, EngineReading, IncidentDetail, Readings, RoadType, RouteState,
    TimeOfDay, Weather,
};
use serde::{Deserialize, Serialize};

/// One tick of one vehicle, as handed to the sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp_unix: i64,
    pub tick:           Tick,
    pub vehicle_id:     VehicleId,
    pub driver_id:      DriverId,
    pub position:       GeoPoint,
    pub odometer_km:    f64,
    pub speed_kmh:      f64,
    pub route_state:    RouteState,
    pub road_type:      RoadType,
    pub time_of_day:    TimeOfDay,
    pub weather:        Weather,
    /// Emissions of the hidden driver state.
    pub driver:         DriverObservation,
    pub telemetry:      Readings,
    pub engine:         EngineReading,
    pub incident_count: u64,
    pub incidents:      Vec<IncidentDetail>,
    /// Set when the speed draw was clamped into the physical range.
    pub speed_clamped:  bool,
    /// Set when the incident rate was raised to its floor.
    pub lambda_floored: bool,
}

/// A record together with the hidden state that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelledRecord {
    pub record:       EventRecord,
    pub driver_state: DriverState,
}

/// Count of numerical corrections applied during a session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionCounters {
    pub speed_clamped:  u64,
    pub lambda_floored: u64,
}

impl CorrectionCounters {
    pub fn total(&self) -> u64 {
        self.speed_clamped + self.lambda_floored
    }

    pub fn merge(&mut self, other: &CorrectionCounters) {
        self.speed_clamped += other.speed_clamped;
        self.lambda_floored += other.lambda_floored;
    }
}

/// End-of-session totals passed to [`EventSink::on_session_end`].
///
/// [`EventSink::on_session_end`]: crate::EventSink::on_session_end
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub vehicle_id:    VehicleId,
    pub driver_id:     DriverId,
    pub ticks:         u64,
    pub delivered:     bool,
    pub odometer_km:   f64,
    pub incidents:     u64,
    pub fuel_used_pct: f64,
    pub corrections:   CorrectionCounters,
}

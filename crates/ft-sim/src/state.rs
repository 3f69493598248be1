//! Mutable per-vehicle state owned by one [`VehicleSession`].
//!
//! [`VehicleSession`]: crate::VehicleSession

use std::fmt;

use ft_core::{DriverId, SimClock, VehicleId, VehicleRng};
use ft_models::{DriverState, Readings, RoutePosition, RouteState};

use crate::profile::InitialContext;

/// Everything that carries over from one tick to the next.
///
/// Only the owning session mutates this.  It is `Send` so a fleet can move
/// sessions between worker threads, but it is never shared.
///
/// The hidden driver state is crate-private and left out of `Debug`; callers
/// read it through [`VehicleSession::tick_labelled`].
///
/// [`VehicleSession::tick_labelled`]: crate::VehicleSession::tick_labelled
#[derive(Clone)]
pub struct VehicleState {
    pub vehicle_id:     VehicleId,
    pub driver_id:      DriverId,
    pub route_state:    RouteState,
    /// Hidden label; never copied into an `EventRecord`.
    pub(crate) driver_state: DriverState,
    /// Last AR(1) value per telemetry channel.
    pub readings:       Readings,
    pub position:       RoutePosition,
    pub speed_kmh:      f64,
    pub fuel_level_pct: f64,
    pub incidents:      u64,
    pub rng:            VehicleRng,
    pub clock:          SimClock,
    /// Records emitted so far.
    pub ticks_emitted:  u64,
    pub context:        InitialContext,
}

impl fmt::Debug for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleState")
            .field("vehicle_id", &self.vehicle_id)
            .field("driver_id", &self.driver_id)
            .field("route_state", &self.route_state)
            .field("readings", &self.readings)
            .field("position", &self.position)
            .field("speed_kmh", &self.speed_kmh)
            .field("fuel_level_pct", &self.fuel_level_pct)
            .field("incidents", &self.incidents)
            .field("clock", &self.clock)
            .field("ticks_emitted", &self.ticks_emitted)
            .finish_non_exhaustive()
    }
}

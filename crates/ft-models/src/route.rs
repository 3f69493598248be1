//! Route Markov chain and the GPS drift model that follows it.

use ft_core::rng::Sampler;
use ft_core::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::context::RoadType;
use crate::matrix::{MarkovState, TransitionMatrix};
use crate::policy::require_non_negative;
use crate::ModelResult;

// ── RouteState ────────────────────────────────────────────────────────────────

/// Location class of a vehicle on its delivery run.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteState {
    #[default]
    Warehouse,
    Highway,
    Urban,
    Customer,
}

impl MarkovState for RouteState {
    const ALL: &'static [Self] = &[
        RouteState::Warehouse,
        RouteState::Highway,
        RouteState::Urban,
        RouteState::Customer,
    ];
    const SPACE: &'static str = "route";

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            RouteState::Warehouse => "warehouse",
            RouteState::Highway   => "highway",
            RouteState::Urban     => "urban",
            RouteState::Customer  => "customer",
        }
    }
}

impl RouteState {
    /// Road class driven while in this state.
    pub fn road_type(self) -> RoadType {
        match self {
            RouteState::Highway => RoadType::Highway,
            _                   => RoadType::Urban,
        }
    }

    /// `true` once the delivery point has been reached.
    #[inline]
    pub fn is_delivery(self) -> bool {
        self == RouteState::Customer
    }
}

// ── RoutePosition ─────────────────────────────────────────────────────────────

/// Where a vehicle is and where it is heading.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutePosition {
    pub point:       GeoPoint,
    pub origin:      GeoPoint,
    pub destination: GeoPoint,
    /// Haversine distance accumulated since the session started.
    pub odometer_km: f64,
}

impl RoutePosition {
    pub fn at_origin(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self { point: origin, origin, destination, odometer_km: 0.0 }
    }

    #[inline]
    pub fn remaining_km(&self) -> f64 {
        self.point.distance_km(self.destination)
    }
}

// ── RouteModel ────────────────────────────────────────────────────────────────

/// Route chain plus positional drift parameters.
#[derive(Clone, Debug)]
pub struct RouteModel {
    matrix:   TransitionMatrix<RouteState>,
    jitter_m: f64,
}

impl RouteModel {
    /// `jitter_m` is the standard deviation of the per-tick lateral GPS
    /// jitter in metres; zero disables it.
    pub fn new(matrix: TransitionMatrix<RouteState>, jitter_m: f64) -> ModelResult<Self> {
        require_non_negative("gps_jitter_m", jitter_m)?;
        Ok(Self { matrix, jitter_m })
    }

    pub fn matrix(&self) -> &TransitionMatrix<RouteState> {
        &self.matrix
    }

    #[inline]
    pub fn initial_state(&self) -> RouteState {
        RouteState::Warehouse
    }

    #[inline]
    pub fn advance<R: Sampler>(&self, current: RouteState, rng: &mut R) -> RouteState {
        self.matrix.sample_next(current, rng)
    }

    /// Move `pos` for one tick at `speed_kmh` over `hours`.
    ///
    /// The vehicle travels along the great circle toward its destination and
    /// never overshoots it; a Gaussian jitter of `jitter_m` metres is then
    /// added on each axis.  The odometer grows by the haversine distance
    /// between the old and new points, so a tick can only move the vehicle
    /// by its travelled distance plus jitter.
    pub fn step_position<R: Sampler>(
        &self,
        pos:       &RoutePosition,
        speed_kmh: f64,
        hours:     f64,
        rng:       &mut R,
    ) -> RoutePosition {
        let travel_km = (speed_kmh * hours).max(0.0);
        let mut next = pos.point.step_toward(pos.destination, travel_km);
        if self.jitter_m > 0.0 {
            let north = rng.normal(0.0, self.jitter_m);
            let east = rng.normal(0.0, self.jitter_m);
            next = next.offset_m(north, east);
        }
        RoutePosition {
            point:       next,
            odometer_km: pos.odometer_km + pos.point.distance_km(next),
            ..*pos
        }
    }
}

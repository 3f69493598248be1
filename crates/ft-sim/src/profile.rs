//! Per-vehicle starting context and the seeded profile generator.

use ft_core::rng::Sampler;
use ft_core::{DriverId, GeoPoint, SimRng};
use ft_models::{DriverState, Experience, Traffic, Weather};
use serde::{Deserialize, Serialize};

/// The environment a session starts in.  Fixed for the session's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitialContext {
    pub driver_id:   DriverId,
    pub experience:  Experience,
    pub weather:     Weather,
    pub traffic:     Traffic,
    pub origin:      GeoPoint,
    pub destination: GeoPoint,
    /// Overrides the draw from the initial distribution π.
    pub initial_driver_state: Option<DriverState>,
}

impl InitialContext {
    pub fn new(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            driver_id:            DriverId(0),
            experience:           Experience::default(),
            weather:              Weather::default(),
            traffic:              Traffic::default(),
            origin,
            destination,
            initial_driver_state: None,
        }
    }
}

/// Default depot region.
pub const DEFAULT_BASE: GeoPoint = GeoPoint { lat: 24.8607, lon: 67.0011 };

const EXPERIENCE_WEIGHTS: [f64; 4] = [0.20, 0.35, 0.30, 0.15];
const WEATHER_WEIGHTS: [f64; 4] = [0.60, 0.20, 0.10, 0.10];
const TRAFFIC_WEIGHTS: [f64; 4] = [0.25, 0.40, 0.25, 0.10];

/// Draws vehicle contexts from a fleet-level stream.
///
/// Warehouses are scattered up to `warehouse_spread_deg` around `base`;
/// each customer lies within `customer_spread_deg` of its warehouse.  The
/// output depends only on the seed and the requested count, and the first
/// `n` profiles of a larger fleet match a fleet of `n`.
#[derive(Clone, Debug)]
pub struct ProfileGenerator {
    pub base:                 GeoPoint,
    pub warehouse_spread_deg: f64,
    pub customer_spread_deg:  f64,
    seed:                     u64,
}

impl ProfileGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            base:                 DEFAULT_BASE,
            warehouse_spread_deg: 2.0,
            customer_spread_deg:  0.5,
            seed,
        }
    }

    pub fn base(mut self, base: GeoPoint) -> Self {
        self.base = base;
        self
    }

    pub fn generate(&self, count: usize) -> Vec<InitialContext> {
        let mut rng = SimRng::new(self.seed).child(0x5052_4f46);
        let (w, c) = (self.warehouse_spread_deg, self.customer_spread_deg);
        (0..count)
            .map(|i| {
                let origin = GeoPoint::new(
                    self.base.lat + rng.uniform_range(-w, w),
                    self.base.lon + rng.uniform_range(-w, w),
                );
                let destination = GeoPoint::new(
                    origin.lat + rng.uniform_range(-c, c),
                    origin.lon + rng.uniform_range(-c, c),
                );
                InitialContext {
                    driver_id:            DriverId(i as u32),
                    experience:           pick(&Experience::ALL, &EXPERIENCE_WEIGHTS, &mut rng),
                    weather:              pick(&Weather::ALL, &WEATHER_WEIGHTS, &mut rng),
                    traffic:              pick(&Traffic::ALL, &TRAFFIC_WEIGHTS, &mut rng),
                    origin,
                    destination,
                    initial_driver_state: None,
                }
            })
            .collect()
    }
}

fn pick<T: Copy + Default>(values: &[T], weights: &[f64], rng: &mut SimRng) -> T {
    rng.categorical(weights)
        .and_then(|i| values.get(i).copied())
        .unwrap_or_default()
}

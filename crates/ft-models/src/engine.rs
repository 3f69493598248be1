//! Deterministic engine readings derived from speed and sensor state.

use serde::{Deserialize, Serialize};

use crate::policy::{require_non_negative, require_positive};
use crate::{ModelError, ModelResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    pub tank_capacity_l:        f64,
    pub initial_fuel_pct:       f64,
    /// Fuel burn at idle before load terms, L/h.
    pub base_fuel_rate_lph:     f64,
    pub max_rpm:                f64,
    pub min_fuel_rate_lph:      f64,
    pub max_fuel_rate_lph:      f64,
    /// Extra L/h per °C the engine runs below its target temperature.
    pub cold_penalty_lph_per_c: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            tank_capacity_l:        400.0,
            initial_fuel_pct:       100.0,
            base_fuel_rate_lph:     8.0,
            max_rpm:                4_500.0,
            min_fuel_rate_lph:      2.0,
            max_fuel_rate_lph:      30.0,
            cold_penalty_lph_per_c: 0.05,
        }
    }
}

impl EngineParams {
    pub fn validate(&self) -> ModelResult<()> {
        require_positive("engine.tank_capacity_l", self.tank_capacity_l)?;
        require_positive("engine.max_rpm", self.max_rpm)?;
        require_non_negative("engine.base_fuel_rate_lph", self.base_fuel_rate_lph)?;
        require_non_negative("engine.min_fuel_rate_lph", self.min_fuel_rate_lph)?;
        require_non_negative("engine.cold_penalty_lph_per_c", self.cold_penalty_lph_per_c)?;
        if !(0.0..=100.0).contains(&self.initial_fuel_pct) {
            return Err(ModelError::Config(format!(
                "engine.initial_fuel_pct must be within [0, 100], got {}",
                self.initial_fuel_pct
            )));
        }
        if !self.max_fuel_rate_lph.is_finite() || self.max_fuel_rate_lph < self.min_fuel_rate_lph {
            return Err(ModelError::Config(
                "engine.max_fuel_rate_lph must be finite and >= engine.min_fuel_rate_lph".into(),
            ));
        }
        Ok(())
    }
}

/// Engine state reported alongside the AR(1) channels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineReading {
    pub rpm:            f64,
    pub throttle_pct:   f64,
    pub fuel_rate_lph:  f64,
    pub fuel_level_pct: f64,
}

/// Inputs the engine model reads for one tick.
#[derive(Copy, Clone, Debug)]
pub struct EngineInputs {
    pub speed_kmh:              f64,
    pub acceleration_intensity: f64,
    pub engine_temp_c:          f64,
    pub target_temp_c:          f64,
    pub hours:                  f64,
}

#[derive(Clone, Debug)]
pub struct EngineModel {
    params: EngineParams,
}

impl EngineModel {
    pub fn new(params: EngineParams) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// RPM by gear band: steep in first gears, flatter at cruise.
    pub fn rpm(&self, speed_kmh: f64) -> f64 {
        let v = speed_kmh.max(0.0);
        let rpm = if v < 20.0 {
            800.0 + 40.0 * v
        } else if v < 60.0 {
            1_500.0 + 25.0 * (v - 20.0)
        } else {
            2_500.0 + 15.0 * (v - 60.0)
        };
        rpm.min(self.params.max_rpm)
    }

    /// Throttle position from cruise load plus the driver's acceleration.
    pub fn throttle_pct(&self, speed_kmh: f64, acceleration_intensity: f64) -> f64 {
        (speed_kmh.max(0.0) / 140.0 * 70.0 + acceleration_intensity * 30.0).clamp(0.0, 100.0)
    }

    pub fn fuel_rate_lph(
        &self,
        speed_kmh:     f64,
        rpm:           f64,
        throttle_pct:  f64,
        engine_temp_c: f64,
        target_temp_c: f64,
    ) -> f64 {
        let p = &self.params;
        let cold = (target_temp_c - engine_temp_c).max(0.0) * p.cold_penalty_lph_per_c;
        let rate = p.base_fuel_rate_lph
            + (speed_kmh / 100.0).powi(2) * 3.0
            + rpm / 1_000.0 * 0.5
            + throttle_pct / 100.0 * 4.0
            + cold;
        rate.clamp(p.min_fuel_rate_lph, p.max_fuel_rate_lph)
    }

    pub fn initial_fuel_pct(&self) -> f64 {
        self.params.initial_fuel_pct
    }

    /// Reading for one tick, burning fuel from `fuel_level_pct`.
    pub fn reading(&self, fuel_level_pct: f64, inputs: &EngineInputs) -> EngineReading {
        let rpm = self.rpm(inputs.speed_kmh);
        let throttle = self.throttle_pct(inputs.speed_kmh, inputs.acceleration_intensity);
        let rate = self.fuel_rate_lph(
            inputs.speed_kmh,
            rpm,
            throttle,
            inputs.engine_temp_c,
            inputs.target_temp_c,
        );
        let burned_pct = rate * inputs.hours.max(0.0) / self.params.tank_capacity_l * 100.0;
        EngineReading {
            rpm,
            throttle_pct:   throttle,
            fuel_rate_lph:  rate,
            fuel_level_pct: (fuel_level_pct - burned_pct).max(0.0),
        }
    }
}

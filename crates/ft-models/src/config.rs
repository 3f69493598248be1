//! Generator configuration and the validated, immutable [`ModelSet`].
//!
//! `GeneratorConfig` mirrors the JSON configuration file.  Every section has
//! a default, so a file only needs the keys it overrides.  All validation
//! happens in [`GeneratorConfig::build`]; nothing is corrected later.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::driver::{default_emissions, DriverModel, DriverState, EmissionParams};
use crate::engine::{EngineModel, EngineParams};
use crate::incident::{IncidentModel, PoissonRiskFactors};
use crate::matrix::{MarkovState, TransitionMatrix};
use crate::policy::{PerDriverState, SpeedPolicy};
use crate::route::{RouteModel, RouteState};
use crate::speed::{SpeedModel, SpeedParams};
use crate::telemetry::{default_channels, Ar1Params, Channel, TelemetryModel};
use crate::ModelResult;

// ── Config sections ───────────────────────────────────────────────────────────

/// Transition rows keyed by state name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionMatricesConfig {
    pub route:  BTreeMap<String, Vec<f64>>,
    pub driver: BTreeMap<String, Vec<f64>>,
}

/// Key `rows`, given in `S::ALL` order, by state name.
fn named_rows<S: MarkovState>(rows: &[&[f64]]) -> BTreeMap<String, Vec<f64>> {
    S::ALL
        .iter()
        .zip(rows)
        .map(|(s, r)| (s.name().to_owned(), r.to_vec()))
        .collect()
}

impl Default for TransitionMatricesConfig {
    fn default() -> Self {
        Self {
            // warehouse, highway, urban, customer
            route: named_rows::<RouteState>(&[
                &[0.10, 0.60, 0.30, 0.00],
                &[0.00, 0.70, 0.25, 0.05],
                &[0.00, 0.15, 0.60, 0.25],
                &[0.00, 0.00, 0.00, 1.00],
            ]),
            // normal, aggressive, tired
            driver: named_rows::<DriverState>(&[
                &[0.85, 0.10, 0.05],
                &[0.30, 0.60, 0.10],
                &[0.20, 0.05, 0.75],
            ]),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed:                 u64,
    pub transition_matrices:  TransitionMatricesConfig,
    /// Initial hidden-state distribution π.
    pub driver_initial:       PerDriverState<f64>,
    pub emission_params:      PerDriverState<EmissionParams>,
    pub ar1_params:           BTreeMap<Channel, Ar1Params>,
    pub speed:                SpeedParams,
    pub poisson_risk_factors: PoissonRiskFactors,
    pub policy:               SpeedPolicy,
    pub engine:               EngineParams,
    /// Standard deviation of the per-tick GPS jitter, metres.
    pub gps_jitter_m:         f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed:                 42,
            transition_matrices:  TransitionMatricesConfig::default(),
            driver_initial:       PerDriverState { normal: 0.80, aggressive: 0.15, tired: 0.05 },
            emission_params:      default_emissions(),
            ar1_params:           default_channels(),
            speed:                SpeedParams::default(),
            poisson_risk_factors: PoissonRiskFactors::default(),
            policy:               SpeedPolicy::default(),
            engine:               EngineParams::default(),
            gps_jitter_m:         5.0,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> ModelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every section and assemble the shared model set.
    pub fn build(&self) -> ModelResult<ModelSet> {
        let matrices = &self.transition_matrices;
        let route_matrix = TransitionMatrix::<RouteState>::from_named_rows(&matrices.route)?;
        let driver_matrix = TransitionMatrix::<DriverState>::from_named_rows(&matrices.driver)?;
        let pi = [
            self.driver_initial.normal,
            self.driver_initial.aggressive,
            self.driver_initial.tired,
        ];

        let models = ModelSet {
            route:     RouteModel::new(route_matrix, self.gps_jitter_m)?,
            driver:    DriverModel::new(driver_matrix, pi, self.emission_params.clone())?,
            speed:     SpeedModel::new(self.speed.clone(), self.policy.clone())?,
            incident:  IncidentModel::new(self.poisson_risk_factors.clone())?,
            telemetry: TelemetryModel::new(self.ar1_params.clone())?,
            engine:    EngineModel::new(self.engine.clone())?,
        };
        log::debug!("model set built with {} telemetry channels", self.ar1_params.len());
        Ok(models)
    }
}

// ── ModelSet ──────────────────────────────────────────────────────────────────

/// The validated models, read-only after construction.
///
/// Shared between sessions as `Arc<ModelSet>`; no model holds mutable
/// state, so no locking is needed.
#[derive(Clone, Debug)]
pub struct ModelSet {
    pub route:     RouteModel,
    pub driver:    DriverModel,
    pub speed:     SpeedModel,
    pub incident:  IncidentModel,
    pub telemetry: TelemetryModel,
    pub engine:    EngineModel,
}

impl ModelSet {
    pub fn into_shared(self) -> Arc<ModelSet> {
        Arc::new(self)
    }
}

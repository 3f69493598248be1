//! Poisson incident model.
//!
//! The rate for one tick is
//!
//! ```text
//! λ = ( base · experience(e) · weather(w) · traffic(t) · time(tod) · driver(s)
//!       + driver_uplift(s) ) · interval_hours
//! ```
//!
//! Multipliers must be positive, so λ can only go negative through a
//! negative uplift.  Any λ below `lambda_floor` is raised to the floor and
//! the estimate is flagged; the session turns the flag into a warning.

use ft_core::rng::Sampler;
use serde::{Deserialize, Serialize};

use crate::context::IncidentContext;
use crate::policy::{
    require_all_finite, require_all_positive, require_non_negative, require_positive,
    PerDriverState, PerExperience, PerTimeOfDay, PerTraffic, PerWeather,
};
use crate::ModelResult;

// ── Risk factors ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoissonRiskFactors {
    /// Incidents per driving hour before any adjustment.
    pub base_lambda_per_hour: f64,
    pub experience:           PerExperience<f64>,
    pub weather:              PerWeather<f64>,
    pub traffic:              PerTraffic<f64>,
    pub time_of_day:          PerTimeOfDay<f64>,
    pub driver_multiplier:    PerDriverState<f64>,
    /// Added to the hourly rate after the multipliers.
    pub driver_uplift:        PerDriverState<f64>,
    pub lambda_floor:         f64,
}

impl Default for PoissonRiskFactors {
    fn default() -> Self {
        Self {
            base_lambda_per_hour: 0.2,
            experience: PerExperience { novice: 3.0, intermediate: 1.5, expert: 1.0, master: 0.6 },
            weather:    PerWeather { clear: 1.0, rain: 2.0, fog: 2.5, dust: 1.8 },
            traffic:    PerTraffic { light: 0.8, moderate: 1.0, heavy: 1.7, congested: 2.2 },
            time_of_day: PerTimeOfDay {
                morning_rush: 1.5,
                midday:       1.0,
                evening_rush: 1.6,
                night:        1.3,
            },
            driver_multiplier: PerDriverState { normal: 1.0, aggressive: 2.0, tired: 1.6 },
            driver_uplift:     PerDriverState { normal: 0.0, aggressive: 0.0, tired: 0.0 },
            lambda_floor:      1e-6,
        }
    }
}

impl PoissonRiskFactors {
    pub fn validate(&self) -> ModelResult<()> {
        require_non_negative("poisson_risk_factors.base_lambda_per_hour", self.base_lambda_per_hour)?;
        require_all_positive("poisson_risk_factors.experience", self.experience.values())?;
        require_all_positive("poisson_risk_factors.weather", self.weather.values())?;
        require_all_positive("poisson_risk_factors.traffic", self.traffic.values())?;
        require_all_positive("poisson_risk_factors.time_of_day", self.time_of_day.values())?;
        require_all_positive("poisson_risk_factors.driver_multiplier", self.driver_multiplier.values())?;
        require_all_finite("poisson_risk_factors.driver_uplift", self.driver_uplift.values())?;
        require_positive("poisson_risk_factors.lambda_floor", self.lambda_floor)
    }
}

// ── Incident details ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Speeding,
    HarshAcceleration,
    HarshBraking,
    SharpTurn,
    SuddenLaneChange,
}

impl IncidentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentKind::Speeding          => "speeding",
            IncidentKind::HarshAcceleration => "harsh_acceleration",
            IncidentKind::HarshBraking      => "harsh_braking",
            IncidentKind::SharpTurn         => "sharp_turn",
            IncidentKind::SuddenLaneChange  => "sudden_lane_change",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low    => "low",
            Severity::Medium => "medium",
            Severity::High   => "high",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentDetail {
    pub kind:     IncidentKind,
    pub severity: Severity,
}

const FAST_KINDS: [(IncidentKind, f64); 3] = [
    (IncidentKind::Speeding, 0.6),
    (IncidentKind::HarshAcceleration, 0.3),
    (IncidentKind::SharpTurn, 0.1),
];

const CRUISE_KINDS: [(IncidentKind, f64); 4] = [
    (IncidentKind::HarshBraking, 0.4),
    (IncidentKind::SharpTurn, 0.3),
    (IncidentKind::SuddenLaneChange, 0.2),
    (IncidentKind::Speeding, 0.1),
];

const SLOW_KINDS: [(IncidentKind, f64); 3] = [
    (IncidentKind::HarshBraking, 0.5),
    (IncidentKind::HarshAcceleration, 0.3),
    (IncidentKind::SuddenLaneChange, 0.2),
];

const SEVERITIES: [(Severity, f64); 3] = [
    (Severity::Low, 0.70),
    (Severity::Medium, 0.25),
    (Severity::High, 0.05),
];

fn pick<T: Copy, R: Sampler>(table: &[(T, f64)], rng: &mut R) -> T {
    let weights: Vec<f64> = table.iter().map(|(_, w)| *w).collect();
    let i = rng.categorical(&weights).unwrap_or(0);
    table[i].0
}

// ── IncidentModel ─────────────────────────────────────────────────────────────

/// A λ computation, with the floor correction made visible.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LambdaEstimate {
    pub lambda:  f64,
    /// λ before flooring.
    pub raw:     f64,
    pub floored: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IncidentSample {
    pub count:    u64,
    pub estimate: LambdaEstimate,
}

#[derive(Clone, Debug)]
pub struct IncidentModel {
    factors: PoissonRiskFactors,
}

impl IncidentModel {
    pub fn new(factors: PoissonRiskFactors) -> ModelResult<Self> {
        factors.validate()?;
        Ok(Self { factors })
    }

    pub fn factors(&self) -> &PoissonRiskFactors {
        &self.factors
    }

    pub fn lambda(&self, ctx: &IncidentContext) -> LambdaEstimate {
        let f = &self.factors;
        let hourly = f.base_lambda_per_hour
            * f.experience.get(ctx.experience)
            * f.weather.get(ctx.weather)
            * f.traffic.get(ctx.traffic)
            * f.time_of_day.get(ctx.time_of_day)
            * f.driver_multiplier.get(ctx.driver_state)
            + f.driver_uplift.get(ctx.driver_state);
        let raw = hourly * ctx.interval_hours.max(0.0);

        if raw < f.lambda_floor {
            LambdaEstimate { lambda: f.lambda_floor, raw, floored: true }
        } else {
            LambdaEstimate { lambda: raw, raw, floored: false }
        }
    }

    /// Draw the tick's incident count from Poisson(λ).
    pub fn sample<R: Sampler>(&self, ctx: &IncidentContext, rng: &mut R) -> ModelResult<IncidentSample> {
        let estimate = self.lambda(ctx);
        let count = rng.poisson(estimate.lambda)?;
        Ok(IncidentSample { count, estimate })
    }

    /// Kind and severity for each of `count` incidents at `speed_kmh`.
    pub fn details<R: Sampler>(&self, count: u64, speed_kmh: f64, rng: &mut R) -> Vec<IncidentDetail> {
        let kinds: &[(IncidentKind, f64)] = if speed_kmh > 100.0 {
            &FAST_KINDS
        } else if speed_kmh > 60.0 {
            &CRUISE_KINDS
        } else {
            &SLOW_KINDS
        };
        (0..count)
            .map(|_| IncidentDetail { kind: pick(kinds, rng), severity: pick(&SEVERITIES, rng) })
            .collect()
    }
}

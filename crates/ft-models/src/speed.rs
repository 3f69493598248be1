//! Gaussian speed model conditioned on road, time, weather and driver state.

use ft_core::rng::Sampler;
use serde::{Deserialize, Serialize};

use crate::context::{RoadType, SpeedContext, TimeOfDay, Weather};
use crate::driver::DriverState;
use crate::matrix::MarkovState;
use crate::policy::{require_non_negative, require_positive, Gaussian, SpeedPolicy};
use crate::{ModelError, ModelResult};

/// Base speed distributions and the physical range speeds are clamped to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedParams {
    pub highway: Gaussian,
    pub urban:   Gaussian,
    pub rural:   Gaussian,
    pub min_kmh: f64,
    pub max_kmh: f64,
    /// Largest per-tick change allowed by [`SpeedModel::smooth`].  `None`
    /// leaves consecutive samples independent.
    pub max_change_kmh: Option<f64>,
}

impl Default for SpeedParams {
    fn default() -> Self {
        Self {
            highway:        Gaussian::new(90.0, 9.0),
            urban:          Gaussian::new(45.0, 4.5),
            rural:          Gaussian::new(70.0, 7.0),
            min_kmh:        0.0,
            max_kmh:        150.0,
            max_change_kmh: None,
        }
    }
}

impl SpeedParams {
    pub fn validate(&self) -> ModelResult<()> {
        self.highway.validate("speed.highway")?;
        self.urban.validate("speed.urban")?;
        self.rural.validate("speed.rural")?;
        require_non_negative("speed.min_kmh", self.min_kmh)?;
        if !self.max_kmh.is_finite() || self.max_kmh <= self.min_kmh {
            return Err(ModelError::Config(format!(
                "speed.max_kmh ({}) must be finite and above speed.min_kmh ({})",
                self.max_kmh, self.min_kmh
            )));
        }
        if let Some(step) = self.max_change_kmh {
            require_positive("speed.max_change_kmh", step)?;
        }
        Ok(())
    }

    pub fn base(&self, road: RoadType) -> Gaussian {
        match road {
            RoadType::Highway => self.highway,
            RoadType::Urban   => self.urban,
            RoadType::Rural   => self.rural,
        }
    }
}

/// One speed draw.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeedSample {
    pub speed_kmh: f64,
    /// The unclamped draw `μ + σ·Z`.
    pub raw_kmh:   f64,
    /// Set when `raw_kmh` fell outside `[min_kmh, max_kmh]`.
    pub clamped:   bool,
}

/// Least distance, in σ, between any context's mean and the nearer clamp
/// bound before [`SpeedModel::new`] warns.  3σ leaves about 0.13 % of draws
/// per side to the clamp.
pub const MIN_CLAMP_HEADROOM_SIGMA: f64 = 3.0;

#[derive(Clone, Debug)]
pub struct SpeedModel {
    params: SpeedParams,
    policy: SpeedPolicy,
}

impl SpeedModel {
    pub fn new(params: SpeedParams, policy: SpeedPolicy) -> ModelResult<Self> {
        params.validate()?;
        policy.validate()?;
        let model = Self { params, policy };

        let (ctx, headroom) = model.tightest_context();
        if headroom < MIN_CLAMP_HEADROOM_SIGMA {
            let d = model.distribution(&ctx);
            log::warn!(
                "speed N({:.1}, {:.1}) for {} / {} / {} / {} sits {:.2}σ from the \
                 [{}, {}] km/h clamp; clamped draws will distort its tail",
                d.mean,
                d.std,
                ctx.road_type.as_str(),
                ctx.time_of_day.as_str(),
                ctx.weather.as_str(),
                ctx.driver_state.name(),
                headroom,
                model.params.min_kmh,
                model.params.max_kmh
            );
        }
        Ok(model)
    }

    pub fn params(&self) -> &SpeedParams {
        &self.params
    }

    pub fn policy(&self) -> &SpeedPolicy {
        &self.policy
    }

    /// The (μ, σ) pair fixed by `ctx`.  See [`crate::policy`] for the form.
    pub fn distribution(&self, ctx: &SpeedContext) -> Gaussian {
        let base = self.params.base(ctx.road_type);
        let p = &self.policy;
        let state = p.driver.get(ctx.driver_state);

        let mean = base.mean
            * p.time_mean.get(ctx.time_of_day)
            * p.weather_mean.get(ctx.weather)
            * state.mean;

        let rush = if ctx.time_of_day.is_rush_hour() { p.rush_std_factor } else { 1.0 };
        let std = base.std
            * rush
            * (1.0 + p.weather_std_gain * ctx.weather.severity())
            * state.std;

        Gaussian::new(mean, std)
    }

    /// Distance from μ to the nearer of `min_kmh` and `max_kmh`, in units
    /// of σ.  Negative when μ itself lies outside the range.
    pub fn clamp_headroom(&self, ctx: &SpeedContext) -> f64 {
        let d = self.distribution(ctx);
        let gap = (d.mean - self.params.min_kmh).min(self.params.max_kmh - d.mean);
        gap / d.std
    }

    /// The context with the least [`clamp_headroom`](Self::clamp_headroom)
    /// over every road, time of day, weather and driver state.
    pub fn tightest_context(&self) -> (SpeedContext, f64) {
        let first = SpeedContext {
            road_type:    RoadType::ALL[0],
            time_of_day:  TimeOfDay::ALL[0],
            weather:      Weather::ALL[0],
            driver_state: DriverState::Normal,
        };
        let mut tightest = (first, self.clamp_headroom(&first));
        for road_type in RoadType::ALL {
            for time_of_day in TimeOfDay::ALL {
                for weather in Weather::ALL {
                    for &driver_state in DriverState::ALL {
                        let ctx = SpeedContext { road_type, time_of_day, weather, driver_state };
                        let headroom = self.clamp_headroom(&ctx);
                        if headroom < tightest.1 {
                            tightest = (ctx, headroom);
                        }
                    }
                }
            }
        }
        tightest
    }

    /// Draw `μ + σ·Z` and clamp it into the physical range.
    pub fn sample<R: Sampler>(&self, ctx: &SpeedContext, rng: &mut R) -> SpeedSample {
        let raw = self.distribution(ctx).sample(rng);
        let speed = raw.clamp(self.params.min_kmh, self.params.max_kmh);
        SpeedSample { speed_kmh: speed, raw_kmh: raw, clamped: speed != raw }
    }

    /// Limit the change from `previous` to `max_change_kmh`, if configured.
    pub fn smooth(&self, previous: f64, current: f64) -> f64 {
        match self.params.max_change_kmh {
            Some(step) => current.clamp(previous - step, previous + step),
            None       => current,
        }
    }
}

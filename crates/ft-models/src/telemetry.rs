//! AR(1) engine-sensor channels.
//!
//! Each channel evolves as
//!
//! ```text
//! x[t] = φ·x[t−1] + (1 − φ)·target_mean + ε,   ε ~ N(0, σ²)
//! ```
//!
//! which is stationary around `target_mean` for |φ| < 1 with lag-k
//! autocorrelation φᵏ.

use std::collections::BTreeMap;

use ft_core::rng::Sampler;
use serde::{Deserialize, Serialize};

use crate::policy::require_positive;
use crate::{ModelError, ModelResult};

/// Telemetry channels carried in every record, in output order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Engine temperature, °C.
    EngineTemp,
    /// Coolant temperature, °C.
    CoolantTemp,
    /// Oil pressure, psi.
    OilPressure,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::EngineTemp, Channel::CoolantTemp, Channel::OilPressure];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::EngineTemp  => "engine_temp",
            Channel::CoolantTemp => "coolant_temp",
            Channel::OilPressure => "oil_pressure",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ar1Params {
    pub phi:         f64,
    pub sigma:       f64,
    pub target_mean: f64,
    /// Added to `target_mean` for the first value.  Zero starts the
    /// process at equilibrium.
    #[serde(default)]
    pub cold_start_offset: f64,
}

impl Ar1Params {
    pub const fn new(phi: f64, sigma: f64, target_mean: f64) -> Self {
        Self { phi, sigma, target_mean, cold_start_offset: 0.0 }
    }

    pub fn validate(&self, channel: Channel) -> ModelResult<()> {
        if !self.phi.is_finite() || self.phi.abs() >= 1.0 {
            return Err(ModelError::NonStationary { channel: channel.as_str().to_owned(), phi: self.phi });
        }
        require_positive(format!("ar1_params.{}.sigma", channel.as_str()), self.sigma)?;
        if !self.target_mean.is_finite() || !self.cold_start_offset.is_finite() {
            return Err(ModelError::Config(format!(
                "ar1_params.{}: target_mean and cold_start_offset must be finite",
                channel.as_str()
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn initial_value(&self) -> f64 {
        self.target_mean + self.cold_start_offset
    }

    /// One step of the recurrence from `previous`.
    #[inline]
    pub fn advance<R: Sampler>(&self, previous: f64, rng: &mut R) -> f64 {
        self.phi * previous + (1.0 - self.phi) * self.target_mean + rng.normal(0.0, self.sigma)
    }

    /// Theoretical lag-k autocorrelation φᵏ.
    #[inline]
    pub fn autocorrelation(&self, lag: u32) -> f64 {
        self.phi.powi(lag as i32)
    }

    /// Standard deviation of the stationary distribution, `σ / √(1 − φ²)`.
    pub fn stationary_std(&self) -> f64 {
        self.sigma / (1.0 - self.phi * self.phi).sqrt()
    }
}

pub fn default_channels() -> BTreeMap<Channel, Ar1Params> {
    BTreeMap::from([
        (Channel::EngineTemp, Ar1Params::new(0.95, 1.0, 90.0)),
        (Channel::CoolantTemp, Ar1Params::new(0.97, 0.5, 85.0)),
        (Channel::OilPressure, Ar1Params::new(0.90, 2.0, 40.0)),
    ])
}

/// Readings keyed by channel; iteration order is the output column order.
pub type Readings = BTreeMap<Channel, f64>;

#[derive(Clone, Debug)]
pub struct TelemetryModel {
    channels: BTreeMap<Channel, Ar1Params>,
}

impl TelemetryModel {
    pub fn new(channels: BTreeMap<Channel, Ar1Params>) -> ModelResult<Self> {
        if channels.is_empty() {
            return Err(ModelError::Config("ar1_params must configure at least one channel".into()));
        }
        for (&channel, params) in &channels {
            params.validate(channel)?;
        }
        Ok(Self { channels })
    }

    pub fn channel(&self, channel: Channel) -> Option<&Ar1Params> {
        self.channels.get(&channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = (Channel, &Ar1Params)> {
        self.channels.iter().map(|(c, p)| (*c, p))
    }

    pub fn initial_readings(&self) -> Readings {
        self.channels.iter().map(|(c, p)| (*c, p.initial_value())).collect()
    }

    /// Advance every configured channel, in channel order.
    ///
    /// A channel missing from `previous` restarts from its initial value.
    pub fn advance<R: Sampler>(&self, previous: &Readings, rng: &mut R) -> Readings {
        self.channels
            .iter()
            .map(|(c, p)| {
                let prev = previous.get(c).copied().unwrap_or_else(|| p.initial_value());
                (*c, p.advance(prev, rng))
            })
            .collect()
    }
}

//! Conditioning policy: how environment and driver state shift model
//! parameters.
//!
//! The functional forms are fixed and documented here; the factors are
//! configuration.  Speed:
//!
//! ```text
//! μ = base_mean(road) · time_mean(tod) · weather_mean(w) · driver.mean(s)
//! σ = base_std(road)  · (rush ? rush_std_factor : 1)
//!                     · (1 + weather_std_gain · severity(w)) · driver.std(s)
//! ```
//!
//! The incident-rate form lives next to its factors in
//! [`crate::incident::PoissonRiskFactors`].

use ft_core::rng::Sampler;
use serde::{Deserialize, Serialize};

use crate::context::{Experience, TimeOfDay, Traffic, Weather};
use crate::driver::DriverState;
use crate::{ModelError, ModelResult};

// ── Gaussian parameters ───────────────────────────────────────────────────────

/// `N(mean, std²)` parameters as they appear in configuration.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub mean: f64,
    pub std:  f64,
}

impl Gaussian {
    pub const fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// `mean` finite, `std` finite and strictly positive.
    pub fn validate(&self, what: &str) -> ModelResult<()> {
        if !self.mean.is_finite() {
            return Err(ModelError::Config(format!("{what}.mean must be finite, got {}", self.mean)));
        }
        require_positive(format!("{what}.std"), self.std)
    }

    #[inline]
    pub fn sample<R: Sampler>(&self, rng: &mut R) -> f64 {
        rng.normal(self.mean, self.std)
    }

    /// Log density up to the shared `-½·ln(2π)` constant.
    #[inline]
    pub fn log_density(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.std;
        -0.5 * z * z - self.std.ln()
    }
}

// ── Lookup tables ─────────────────────────────────────────────────────────────

/// One value per [`TimeOfDay`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerTimeOfDay<T> {
    pub morning_rush: T,
    pub midday:       T,
    pub evening_rush: T,
    pub night:        T,
}

impl<T: Copy> PerTimeOfDay<T> {
    pub fn get(&self, t: TimeOfDay) -> T {
        match t {
            TimeOfDay::MorningRush => self.morning_rush,
            TimeOfDay::Midday      => self.midday,
            TimeOfDay::EveningRush => self.evening_rush,
            TimeOfDay::Night       => self.night,
        }
    }

    pub(crate) fn values(&self) -> [(&'static str, T); 4] {
        [
            ("morning_rush", self.morning_rush),
            ("midday", self.midday),
            ("evening_rush", self.evening_rush),
            ("night", self.night),
        ]
    }
}

/// One value per [`Weather`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerWeather<T> {
    pub clear: T,
    pub rain:  T,
    pub fog:   T,
    pub dust:  T,
}

impl<T: Copy> PerWeather<T> {
    pub fn get(&self, w: Weather) -> T {
        match w {
            Weather::Clear => self.clear,
            Weather::Rain  => self.rain,
            Weather::Fog   => self.fog,
            Weather::Dust  => self.dust,
        }
    }

    pub(crate) fn values(&self) -> [(&'static str, T); 4] {
        [("clear", self.clear), ("rain", self.rain), ("fog", self.fog), ("dust", self.dust)]
    }
}

/// One value per [`Traffic`] class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerTraffic<T> {
    pub light:     T,
    pub moderate:  T,
    pub heavy:     T,
    pub congested: T,
}

impl<T: Copy> PerTraffic<T> {
    pub fn get(&self, t: Traffic) -> T {
        match t {
            Traffic::Light     => self.light,
            Traffic::Moderate  => self.moderate,
            Traffic::Heavy     => self.heavy,
            Traffic::Congested => self.congested,
        }
    }

    pub(crate) fn values(&self) -> [(&'static str, T); 4] {
        [
            ("light", self.light),
            ("moderate", self.moderate),
            ("heavy", self.heavy),
            ("congested", self.congested),
        ]
    }
}

/// One value per [`Experience`] level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerExperience<T> {
    pub novice:       T,
    pub intermediate: T,
    pub expert:       T,
    pub master:       T,
}

impl<T: Copy> PerExperience<T> {
    pub fn get(&self, e: Experience) -> T {
        match e {
            Experience::Novice       => self.novice,
            Experience::Intermediate => self.intermediate,
            Experience::Expert       => self.expert,
            Experience::Master       => self.master,
        }
    }

    pub(crate) fn values(&self) -> [(&'static str, T); 4] {
        [
            ("novice", self.novice),
            ("intermediate", self.intermediate),
            ("expert", self.expert),
            ("master", self.master),
        ]
    }
}

/// One value per hidden [`DriverState`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerDriverState<T> {
    pub normal:     T,
    pub aggressive: T,
    pub tired:      T,
}

impl<T> PerDriverState<T> {
    pub fn get_ref(&self, s: DriverState) -> &T {
        match s {
            DriverState::Normal     => &self.normal,
            DriverState::Aggressive => &self.aggressive,
            DriverState::Tired      => &self.tired,
        }
    }
}

impl<T: Copy> PerDriverState<T> {
    #[inline]
    pub fn get(&self, s: DriverState) -> T {
        *self.get_ref(s)
    }

    pub(crate) fn values(&self) -> [(&'static str, T); 3] {
        [("normal", self.normal), ("aggressive", self.aggressive), ("tired", self.tired)]
    }
}

// ── Validation helpers ────────────────────────────────────────────────────────

pub(crate) fn require_positive(what: impl Into<String>, value: f64) -> ModelResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidVariance { what: what.into(), value })
    }
}

pub(crate) fn require_non_negative(what: impl Into<String>, value: f64) -> ModelResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidRate { what: what.into(), value })
    }
}

pub(crate) fn require_all_positive<const N: usize>(
    table:  &str,
    values: [(&'static str, f64); N],
) -> ModelResult<()> {
    for (key, v) in values {
        require_positive(format!("{table}.{key}"), v)?;
    }
    Ok(())
}

pub(crate) fn require_all_finite<const N: usize>(
    table:  &str,
    values: [(&'static str, f64); N],
) -> ModelResult<()> {
    for (key, v) in values {
        if !v.is_finite() {
            return Err(ModelError::Config(format!("{table}.{key} must be finite, got {v}")));
        }
    }
    Ok(())
}

// ── Speed policy ──────────────────────────────────────────────────────────────

/// Multiplicative adjustment applied to the speed (μ, σ) by a driver state.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedFactors {
    pub mean: f64,
    pub std:  f64,
}

/// How time of day, weather and hidden driver state shift the speed model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedPolicy {
    /// Mean multiplier per time of day.
    pub time_mean:        PerTimeOfDay<f64>,
    /// σ multiplier during morning and evening rush.
    pub rush_std_factor:  f64,
    /// Mean multiplier per weather condition.
    pub weather_mean:     PerWeather<f64>,
    /// σ grows by `1 + weather_std_gain · severity`.
    pub weather_std_gain: f64,
    /// (μ, σ) multipliers per hidden driver state.
    pub driver:           PerDriverState<SpeedFactors>,
}

impl Default for SpeedPolicy {
    fn default() -> Self {
        Self {
            time_mean: PerTimeOfDay {
                morning_rush: 0.80,
                midday:       1.00,
                evening_rush: 0.80,
                night:        1.05,
            },
            rush_std_factor: 1.3,
            weather_mean: PerWeather { clear: 1.0, rain: 0.85, fog: 0.75, dust: 0.8 },
            weather_std_gain: 0.15,
            driver: PerDriverState {
                normal:     SpeedFactors { mean: 1.00, std: 1.00 },
                aggressive: SpeedFactors { mean: 1.15, std: 1.20 },
                tired:      SpeedFactors { mean: 0.90, std: 1.15 },
            },
        }
    }
}

impl SpeedPolicy {
    pub fn validate(&self) -> ModelResult<()> {
        require_all_positive("speed.policy.time_mean", self.time_mean.values())?;
        require_all_positive("speed.policy.weather_mean", self.weather_mean.values())?;
        require_positive("speed.policy.rush_std_factor", self.rush_std_factor)?;
        require_non_negative("speed.policy.weather_std_gain", self.weather_std_gain)?;
        for (state, f) in self.driver.values() {
            require_positive(format!("speed.policy.driver.{state}.mean"), f.mean)?;
            require_positive(format!("speed.policy.driver.{state}.std"), f.std)?;
        }
        Ok(())
    }
}

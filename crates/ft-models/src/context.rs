//! Environment and per-tick conditioning contexts.
//!
//! Contexts are transient: the session assembles one per tick from its
//! current states and clock, passes it by reference to a model, and drops
//! it.  Nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::driver::DriverState;

/// Coarse road class the speed model is parameterised by.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    Highway,
    Urban,
    Rural,
}

impl RoadType {
    pub const ALL: [RoadType; 3] = [RoadType::Highway, RoadType::Urban, RoadType::Rural];

    pub fn as_str(self) -> &'static str {
        match self {
            RoadType::Highway => "highway",
            RoadType::Urban   => "urban",
            RoadType::Rural   => "rural",
        }
    }
}

/// Time-of-day class derived from the session clock.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 07:00–09:59
    MorningRush,
    /// 10:00–16:59
    Midday,
    /// 17:00–19:59
    EveningRush,
    /// 20:00–06:59
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::MorningRush,
        TimeOfDay::Midday,
        TimeOfDay::EveningRush,
        TimeOfDay::Night,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            7..=9   => TimeOfDay::MorningRush,
            10..=16 => TimeOfDay::Midday,
            17..=19 => TimeOfDay::EveningRush,
            _       => TimeOfDay::Night,
        }
    }

    #[inline]
    pub fn is_rush_hour(self) -> bool {
        matches!(self, TimeOfDay::MorningRush | TimeOfDay::EveningRush)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::MorningRush => "morning_rush",
            TimeOfDay::Midday      => "midday",
            TimeOfDay::EveningRush => "evening_rush",
            TimeOfDay::Night       => "night",
        }
    }
}

/// Weather condition for a session.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Fog,
    Dust,
}

impl Weather {
    pub const ALL: [Weather; 4] = [Weather::Clear, Weather::Rain, Weather::Fog, Weather::Dust];

    /// Severity on a 0–1 scale.
    pub fn severity(self) -> f64 {
        match self {
            Weather::Clear => 0.0,
            Weather::Rain  => 0.5,
            Weather::Dust  => 0.6,
            Weather::Fog   => 0.8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Rain  => "rain",
            Weather::Fog   => "fog",
            Weather::Dust  => "dust",
        }
    }
}

/// Traffic density class.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traffic {
    Light,
    #[default]
    Moderate,
    Heavy,
    Congested,
}

impl Traffic {
    pub const ALL: [Traffic; 4] = [Traffic::Light, Traffic::Moderate, Traffic::Heavy, Traffic::Congested];

    pub fn as_str(self) -> &'static str {
        match self {
            Traffic::Light     => "light",
            Traffic::Moderate  => "moderate",
            Traffic::Heavy     => "heavy",
            Traffic::Congested => "congested",
        }
    }
}

/// Driver experience level.  Incident rates fall as experience rises.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
    Novice,
    Intermediate,
    #[default]
    Expert,
    Master,
}

impl Experience {
    pub const ALL: [Experience; 4] = [
        Experience::Novice,
        Experience::Intermediate,
        Experience::Expert,
        Experience::Master,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Experience::Novice       => "novice",
            Experience::Intermediate => "intermediate",
            Experience::Expert       => "expert",
            Experience::Master       => "master",
        }
    }
}

/// Everything the speed model needs to fix (μ, σ) for one tick.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpeedContext {
    pub road_type:    RoadType,
    pub time_of_day:  TimeOfDay,
    pub weather:      Weather,
    pub driver_state: DriverState,
}

/// Everything the incident model needs to fix λ for one tick.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct IncidentContext {
    pub experience:     Experience,
    pub weather:        Weather,
    pub traffic:        Traffic,
    pub time_of_day:    TimeOfDay,
    pub driver_state:   DriverState,
    /// Length of the sampling interval in hours.
    pub interval_hours: f64,
}

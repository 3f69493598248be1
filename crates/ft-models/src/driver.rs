//! Driver-state hidden Markov model.
//!
//! The hidden state evolves under the transition matrix `A`; each tick the
//! state emits a vector of observable driving features drawn from per-state
//! Gaussians `B`.  The hidden label conditions the speed and incident models
//! inside a session but never leaves it in an observable record.

use ft_core::rng::Sampler;
use serde::{Deserialize, Serialize};

use crate::matrix::{validate_distribution, MarkovState, TransitionMatrix};
use crate::policy::{Gaussian, PerDriverState};
use crate::ModelResult;

/// Reaction times are clamped to this range (milliseconds).
pub const REACTION_TIME_MIN_MS: f64 = 300.0;
pub const REACTION_TIME_MAX_MS: f64 = 2_000.0;

// ── DriverState ───────────────────────────────────────────────────────────────

/// Latent behavioural state of a driver.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    #[default]
    Normal,
    Aggressive,
    Tired,
}

impl MarkovState for DriverState {
    const ALL: &'static [Self] = &[DriverState::Normal, DriverState::Aggressive, DriverState::Tired];
    const SPACE: &'static str = "driver";

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            DriverState::Normal     => "normal",
            DriverState::Aggressive => "aggressive",
            DriverState::Tired      => "tired",
        }
    }
}

// ── Emissions ─────────────────────────────────────────────────────────────────

/// Per-state emission parameters, one Gaussian per observable feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionParams {
    /// Deviation from the posted speed, km/h.
    pub speed_deviation:  Gaussian,
    pub acceleration:     Gaussian,
    pub braking:          Gaussian,
    pub steering:         Gaussian,
    pub reaction_time_ms: Gaussian,
    pub lane_keeping:     Gaussian,
}

impl EmissionParams {
    pub fn validate(&self, state: DriverState) -> ModelResult<()> {
        let prefix = format!("emission_params.{}", state.name());
        self.speed_deviation.validate(&format!("{prefix}.speed_deviation"))?;
        self.acceleration.validate(&format!("{prefix}.acceleration"))?;
        self.braking.validate(&format!("{prefix}.braking"))?;
        self.steering.validate(&format!("{prefix}.steering"))?;
        self.reaction_time_ms.validate(&format!("{prefix}.reaction_time_ms"))?;
        self.lane_keeping.validate(&format!("{prefix}.lane_keeping"))
    }
}

/// Default emission table.
pub fn default_emissions() -> PerDriverState<EmissionParams> {
    PerDriverState {
        normal: EmissionParams {
            speed_deviation:  Gaussian::new(0.0, 5.0),
            acceleration:     Gaussian::new(0.3, 0.15),
            braking:          Gaussian::new(0.2, 0.1),
            steering:         Gaussian::new(0.8, 0.1),
            reaction_time_ms: Gaussian::new(700.0, 100.0),
            lane_keeping:     Gaussian::new(0.9, 0.1),
        },
        aggressive: EmissionParams {
            speed_deviation:  Gaussian::new(15.0, 8.0),
            acceleration:     Gaussian::new(0.8, 0.15),
            braking:          Gaussian::new(0.7, 0.2),
            steering:         Gaussian::new(0.4, 0.15),
            reaction_time_ms: Gaussian::new(500.0, 80.0),
            lane_keeping:     Gaussian::new(0.6, 0.2),
        },
        tired: EmissionParams {
            speed_deviation:  Gaussian::new(-5.0, 5.0),
            acceleration:     Gaussian::new(0.2, 0.1),
            braking:          Gaussian::new(0.3, 0.15),
            steering:         Gaussian::new(0.6, 0.2),
            reaction_time_ms: Gaussian::new(1_200.0, 200.0),
            lane_keeping:     Gaussian::new(0.5, 0.25),
        },
    }
}

/// One tick of observable driving behaviour.
///
/// Intensities and scores are clipped to `[0, 1]`; reaction time to
/// [`REACTION_TIME_MIN_MS`]..=[`REACTION_TIME_MAX_MS`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverObservation {
    pub speed_deviation_kmh:    f64,
    pub acceleration_intensity: f64,
    pub braking_intensity:      f64,
    pub steering_smoothness:    f64,
    pub reaction_time_ms:       f64,
    pub lane_keeping:           f64,
}

// ── DriverModel ───────────────────────────────────────────────────────────────

/// Hidden Markov model `(π, A, B)` over [`DriverState`].
#[derive(Clone, Debug)]
pub struct DriverModel {
    transition: TransitionMatrix<DriverState>,
    initial:    [f64; 3],
    emissions:  PerDriverState<EmissionParams>,
}

impl DriverModel {
    pub fn new(
        transition: TransitionMatrix<DriverState>,
        initial:    [f64; 3],
        emissions:  PerDriverState<EmissionParams>,
    ) -> ModelResult<Self> {
        validate_distribution("driver initial", "pi", &initial)?;
        for &state in DriverState::ALL {
            emissions.get_ref(state).validate(state)?;
        }
        Ok(Self { transition, initial, emissions })
    }

    pub fn transition(&self) -> &TransitionMatrix<DriverState> {
        &self.transition
    }

    pub fn initial(&self) -> &[f64; 3] {
        &self.initial
    }

    pub fn emissions(&self, state: DriverState) -> &EmissionParams {
        self.emissions.get_ref(state)
    }

    /// Draw the session's first hidden state from π.
    pub fn initial_state<R: Sampler>(&self, rng: &mut R) -> DriverState {
        rng.categorical(&self.initial)
            .and_then(DriverState::from_index)
            .unwrap_or_default()
    }

    /// Sample the next hidden state from row `current` of `A`.
    #[inline]
    pub fn advance<R: Sampler>(&self, current: DriverState, rng: &mut R) -> DriverState {
        self.transition.sample_next(current, rng)
    }

    /// Sample the observable features emitted by `state`.
    pub fn emit<R: Sampler>(&self, state: DriverState, rng: &mut R) -> DriverObservation {
        let b = self.emissions.get_ref(state);
        DriverObservation {
            speed_deviation_kmh:    b.speed_deviation.sample(rng),
            acceleration_intensity: b.acceleration.sample(rng).clamp(0.0, 1.0),
            braking_intensity:      b.braking.sample(rng).clamp(0.0, 1.0),
            steering_smoothness:    b.steering.sample(rng).clamp(0.0, 1.0),
            reaction_time_ms:       b
                .reaction_time_ms
                .sample(rng)
                .clamp(REACTION_TIME_MIN_MS, REACTION_TIME_MAX_MS),
            lane_keeping:           b.lane_keeping.sample(rng).clamp(0.0, 1.0),
        }
    }

    /// Posterior over hidden states given one observation and a prior.
    ///
    /// Uses Gaussian likelihoods of the speed deviation and reaction time,
    /// combined in log space and normalised with log-sum-exp.  A prior with
    /// no positive mass is returned unchanged.
    pub fn posterior(&self, obs: &DriverObservation, prior: &[f64; 3]) -> [f64; 3] {
        let mut log_post = [f64::NEG_INFINITY; 3];
        for &state in DriverState::ALL {
            let p = prior[state.index()];
            if p <= 0.0 {
                continue;
            }
            let b = self.emissions.get_ref(state);
            log_post[state.index()] = p.ln()
                + b.speed_deviation.log_density(obs.speed_deviation_kmh)
                + b.reaction_time_ms.log_density(obs.reaction_time_ms);
        }

        let max = log_post.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return *prior;
        }
        let mut post = log_post.map(|l| (l - max).exp());
        let total: f64 = post.iter().sum();
        for p in &mut post {
            *p /= total;
        }
        post
    }

    /// Long-run occupancy of each hidden state under `A`.
    pub fn stationary_distribution(&self) -> Vec<f64> {
        self.transition.stationary_distribution()
    }
}

//! Fluent builder for constructing a [`Fleet`].

use std::sync::Arc;

use ft_core::{SimConfig, VehicleId};
use ft_models::ModelSet;

use crate::profile::{InitialContext, ProfileGenerator};
use crate::session::{validate_sim_config, VehicleSession};
use crate::{Fleet, SimError, SimResult};

/// Fluent builder for [`Fleet`].
///
/// # Required inputs
///
/// - [`SimConfig`] — seed, tick duration, run bound, …
/// - `Arc<ModelSet>` — from [`ft_models::GeneratorConfig::build`]
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                         |
/// |-------------------|-------------------------------------------------|
/// | `.vehicles(n)`    | 1                                               |
/// | `.contexts(v)`    | `ProfileGenerator::new(config.seed).generate(n)` |
/// | `.profiles(g)`    | see above                                       |
///
/// # Example
///
/// ```rust,ignore
/// let models = GeneratorConfig::default().build()?.into_shared();
/// let mut fleet = FleetBuilder::new(SimConfig::default(), models)
///     .vehicles(100)
///     .build()?;
/// fleet.run(&mut VecSink::new())?;
/// ```
pub struct FleetBuilder {
    config:    SimConfig,
    models:    Arc<ModelSet>,
    vehicles:  usize,
    contexts:  Option<Vec<InitialContext>>,
    generator: Option<ProfileGenerator>,
}

impl FleetBuilder {
    pub fn new(config: SimConfig, models: Arc<ModelSet>) -> Self {
        Self {
            config,
            models,
            vehicles:  1,
            contexts:  None,
            generator: None,
        }
    }

    pub fn vehicles(mut self, n: usize) -> Self {
        self.vehicles = n;
        self
    }

    /// Supply one starting context per vehicle (must be length `vehicles`).
    pub fn contexts(mut self, contexts: Vec<InitialContext>) -> Self {
        self.contexts = Some(contexts);
        self
    }

    /// Draw contexts from `generator` instead of the default one.
    pub fn profiles(mut self, generator: ProfileGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Validate inputs, start one session per vehicle, and return a
    /// ready-to-run [`Fleet`].
    pub fn build(self) -> SimResult<Fleet> {
        validate_sim_config(&self.config)?;
        if self.vehicles == 0 {
            return Err(SimError::Config("a fleet needs at least one vehicle".into()));
        }
        if u32::try_from(self.vehicles).is_err() {
            return Err(SimError::Config(format!("{} vehicles exceed the id space", self.vehicles)));
        }

        let contexts = match self.contexts {
            Some(c) => {
                if c.len() != self.vehicles {
                    return Err(SimError::ProfileCountMismatch {
                        expected: self.vehicles,
                        got:      c.len(),
                        what:     "initial contexts",
                    });
                }
                c
            }
            None => self
                .generator
                .unwrap_or_else(|| ProfileGenerator::new(self.config.seed))
                .generate(self.vehicles),
        };

        let sessions = contexts
            .into_iter()
            .enumerate()
            .map(|(i, ctx)| {
                let mut session = VehicleSession::new(Arc::clone(&self.models), self.config.clone());
                session.start(VehicleId(i as u32), self.config.seed, ctx)?;
                Ok(session)
            })
            .collect::<SimResult<Vec<_>>>()?;

        Fleet::new(self.config, sessions)
    }
}

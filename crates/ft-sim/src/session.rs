//! The per-vehicle simulation session.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted ──start──▶ Running ──tick…──▶ Completed
//!      │                   │                   ▲
//!      └───────stop────────┴───────stop────────┘
//! ```
//!
//! # One tick
//!
//! The first `tick` after `start` emits the initial state (warehouse, the
//! initial driver state, telemetry at its starting values) without
//! advancing anything.  Every later tick runs, in this order:
//!
//! 1. advance the clock, route chain, hidden driver state and AR(1) channels;
//! 2. sample speed from the just-advanced route and driver state;
//! 3. move the vehicle toward its destination at that speed;
//! 4. sample driver emissions, the incident count and incident details;
//! 5. derive engine readings and assemble the record.
//!
//! The session completes after emitting a record in the customer state
//! (when `stop_on_delivery` is set) or its `max_ticks`-th record.

use std::fmt;
use std::sync::Arc;

use ft_core::{SimConfig, VehicleId, VehicleRng};
use ft_models::{
    Channel, EngineInputs, IncidentContext, ModelSet, RoutePosition, SpeedContext, TimeOfDay,
};

use crate::profile::InitialContext;
use crate::record::{CorrectionCounters, EventRecord, LabelledRecord, SessionSummary};
use crate::state::VehicleState;
use crate::{SimError, SimResult};

// ── SessionStatus ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    NotStarted,
    Running,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::NotStarted => "not started",
            SessionStatus::Running    => "running",
            SessionStatus::Completed  => "completed",
        })
    }
}

/// Reject run settings no session can work with.
pub fn validate_sim_config(config: &SimConfig) -> SimResult<()> {
    if config.tick_duration_secs == 0 {
        return Err(SimError::Config("tick_duration_secs must be > 0".into()));
    }
    if config.max_ticks == 0 {
        return Err(SimError::Config("max_ticks must be > 0".into()));
    }
    if config.num_threads == Some(0) {
        return Err(SimError::Config("num_threads must be > 0 when set".into()));
    }
    Ok(())
}

// ── VehicleSession ────────────────────────────────────────────────────────────

/// Owns one vehicle's [`VehicleState`] and advances every model for it.
///
/// The session is the only writer of its state.  Models are shared
/// read-only through the `Arc<ModelSet>`.
#[derive(Debug)]
pub struct VehicleSession {
    models:   Arc<ModelSet>,
    config:   SimConfig,
    status:   SessionStatus,
    state:    Option<VehicleState>,
    counters: CorrectionCounters,
}

impl VehicleSession {
    pub fn new(models: Arc<ModelSet>, config: SimConfig) -> Self {
        Self {
            models,
            config,
            status:   SessionStatus::NotStarted,
            state:    None,
            counters: CorrectionCounters::default(),
        }
    }

    /// Initialise every model's state for `vehicle_id`.
    ///
    /// The vehicle's RNG sub-stream is derived from `seed` and the id, so a
    /// new session started with the same arguments replays the same records.
    pub fn start(
        &mut self,
        vehicle_id: VehicleId,
        seed:       u64,
        context:    InitialContext,
    ) -> SimResult<()> {
        if self.status != SessionStatus::NotStarted {
            return Err(SimError::InvalidState { op: "start", status: self.status });
        }
        validate_sim_config(&self.config)?;

        let models = &self.models;
        let mut rng = VehicleRng::new(seed, vehicle_id);
        let driver_state = match context.initial_driver_state {
            Some(s) => s,
            None    => models.driver.initial_state(&mut rng),
        };

        self.state = Some(VehicleState {
            vehicle_id,
            driver_id:      context.driver_id,
            route_state:    models.route.initial_state(),
            driver_state,
            readings:       models.telemetry.initial_readings(),
            position:       RoutePosition::at_origin(context.origin, context.destination),
            speed_kmh:      0.0,
            fuel_level_pct: models.engine.initial_fuel_pct(),
            incidents:      0,
            rng,
            clock:          self.config.make_clock(),
            ticks_emitted:  0,
            context,
        });
        self.status = SessionStatus::Running;
        log::debug!("{} started ({} -> running)", vehicle_id.label(), SessionStatus::NotStarted);
        Ok(())
    }

    /// Advance one tick and return the observable record.
    pub fn tick(&mut self) -> SimResult<EventRecord> {
        self.step().map(|labelled| labelled.record)
    }

    /// Advance one tick and return the record with its hidden driver state.
    pub fn tick_labelled(&mut self) -> SimResult<LabelledRecord> {
        self.step()
    }

    /// Move to `Completed`.  Calling it again changes nothing.
    pub fn stop(&mut self) {
        if self.status == SessionStatus::Completed {
            return;
        }
        log::debug!("{} stopped ({} -> completed)", self.label(), self.status);
        self.status = SessionStatus::Completed;
    }

    #[inline]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn state(&self) -> Option<&VehicleState> {
        self.state.as_ref()
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        self.state.as_ref().map(|s| s.vehicle_id)
    }

    pub fn counters(&self) -> CorrectionCounters {
        self.counters
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Totals so far.  `None` before `start`.
    pub fn summary(&self) -> Option<SessionSummary> {
        self.state.as_ref().map(|s| SessionSummary {
            vehicle_id:    s.vehicle_id,
            driver_id:     s.driver_id,
            ticks:         s.ticks_emitted,
            delivered:     s.route_state.is_delivery(),
            odometer_km:   s.position.odometer_km,
            incidents:     s.incidents,
            fuel_used_pct: self.models.engine.initial_fuel_pct() - s.fuel_level_pct,
            corrections:   self.counters,
        })
    }

    /// Consume the session as a lazy record iterator.
    pub fn into_stream(self) -> EventStream {
        EventStream { session: self }
    }

    fn label(&self) -> String {
        self.vehicle_id().map_or_else(|| "session".to_owned(), VehicleId::label)
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    fn step(&mut self) -> SimResult<LabelledRecord> {
        if self.status != SessionStatus::Running {
            return Err(SimError::InvalidState { op: "tick", status: self.status });
        }
        let Some(st) = self.state.as_mut() else {
            return Err(SimError::InvalidState { op: "tick", status: self.status });
        };
        let models = &*self.models;
        let hours = st.clock.tick_hours();
        let advancing = st.ticks_emitted > 0;

        // ── Advance the Markov states and sensors ─────────────────────────
        if advancing {
            st.clock.advance();
            st.route_state = models.route.advance(st.route_state, &mut st.rng);
            st.driver_state = models.driver.advance(st.driver_state, &mut st.rng);
            st.readings = models.telemetry.advance(&st.readings, &mut st.rng);
        }
        let time_of_day = TimeOfDay::from_hour(st.clock.hour_of_day());

        // ── Speed and position ────────────────────────────────────────────
        let speed_ctx = SpeedContext {
            road_type:    st.route_state.road_type(),
            time_of_day,
            weather:      st.context.weather,
            driver_state: st.driver_state,
        };
        let sample = models.speed.sample(&speed_ctx, &mut st.rng);
        let speed = if advancing {
            models.speed.smooth(st.speed_kmh, sample.speed_kmh)
        } else {
            sample.speed_kmh
        };
        if advancing {
            st.position = models.route.step_position(&st.position, speed, hours, &mut st.rng);
        }

        // ── Driver emissions and incidents ────────────────────────────────
        let observation = models.driver.emit(st.driver_state, &mut st.rng);
        let incident_ctx = IncidentContext {
            experience:     st.context.experience,
            weather:        st.context.weather,
            traffic:        st.context.traffic,
            time_of_day,
            driver_state:   st.driver_state,
            interval_hours: hours,
        };
        let incidents = models.incident.sample(&incident_ctx, &mut st.rng)?;
        let details = models.incident.details(incidents.count, speed, &mut st.rng);

        // ── Engine ────────────────────────────────────────────────────────
        let (engine_temp_c, target_temp_c) = match models.telemetry.channel(Channel::EngineTemp) {
            Some(p) => {
                let current = st.readings.get(&Channel::EngineTemp).copied();
                (current.unwrap_or(p.target_mean), p.target_mean)
            }
            None => (0.0, 0.0),
        };
        let engine = models.engine.reading(st.fuel_level_pct, &EngineInputs {
            speed_kmh:              speed,
            acceleration_intensity: observation.acceleration_intensity,
            engine_temp_c,
            target_temp_c,
            hours,
        });

        // ── Corrections ───────────────────────────────────────────────────
        if sample.clamped {
            if self.counters.speed_clamped == 0 {
                log::warn!(
                    "{}: speed draw {:.2} km/h clamped into the physical range",
                    st.vehicle_id.label(),
                    sample.raw_kmh
                );
            }
            self.counters.speed_clamped += 1;
        }
        if incidents.estimate.floored {
            if self.counters.lambda_floored == 0 {
                log::warn!(
                    "{}: incident rate {} raised to floor {}; check poisson_risk_factors",
                    st.vehicle_id.label(),
                    incidents.estimate.raw,
                    incidents.estimate.lambda
                );
            }
            self.counters.lambda_floored += 1;
        }

        // ── Commit and assemble ───────────────────────────────────────────
        st.speed_kmh = speed;
        st.fuel_level_pct = engine.fuel_level_pct;
        st.incidents += incidents.count;
        st.ticks_emitted += 1;

        let record = EventRecord {
            timestamp_unix: st.clock.current_unix_secs(),
            tick:           st.clock.current_tick,
            vehicle_id:     st.vehicle_id,
            driver_id:      st.driver_id,
            position:       st.position.point,
            odometer_km:    st.position.odometer_km,
            speed_kmh:      speed,
            route_state:    st.route_state,
            road_type:      speed_ctx.road_type,
            time_of_day,
            weather:        st.context.weather,
            driver:         observation,
            telemetry:      st.readings.clone(),
            engine,
            incident_count: incidents.count,
            incidents:      details,
            speed_clamped:  sample.clamped,
            lambda_floored: incidents.estimate.floored,
        };
        let labelled = LabelledRecord { record, driver_state: st.driver_state };

        let delivered = self.config.stop_on_delivery && st.route_state.is_delivery();
        if delivered || st.ticks_emitted >= self.config.max_ticks {
            log::debug!(
                "{} completed at {} after {} ticks (delivered: {})",
                st.vehicle_id.label(),
                st.clock,
                st.ticks_emitted,
                st.route_state.is_delivery()
            );
            self.status = SessionStatus::Completed;
        }
        Ok(labelled)
    }
}

// ── EventStream ───────────────────────────────────────────────────────────────

/// Lazy, finite sequence of a session's records.
///
/// Ends when the session completes.  To replay it, start a new session with
/// the same seed and context.
#[derive(Debug)]
pub struct EventStream {
    session: VehicleSession,
}

impl EventStream {
    pub fn session(&self) -> &VehicleSession {
        &self.session
    }

    pub fn into_session(self) -> VehicleSession {
        self.session
    }
}

impl Iterator for EventStream {
    type Item = SimResult<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.session.status() != SessionStatus::Running {
            return None;
        }
        match self.session.tick() {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                self.session.stop();
                Some(Err(e))
            }
        }
    }
}

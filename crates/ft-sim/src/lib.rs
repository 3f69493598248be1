//! `ft-sim` — per-vehicle sessions and the fleet runner.
//!
//! # Session tick
//!
//! ```text
//! start(vehicle, seed, context)      → Running; first tick emits initial state
//! tick():
//!   ① Advance  — clock, route chain, hidden driver state, AR(1) channels
//!   ② Speed    — Gaussian draw conditioned on route + driver state
//!   ③ Move     — great-circle step toward the customer, odometer update
//!   ④ Driver   — emissions of the hidden state
//!   ⑤ Incident — Poisson count + kind/severity per incident
//!   ⑥ Engine   — RPM, throttle, fuel
//!   ⑦ Record   — observable projection handed to the caller
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Runs each fleet tick's session updates on Rayon.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ft_core::SimConfig;
//! use ft_models::GeneratorConfig;
//! use ft_sim::{FleetBuilder, VecSink};
//!
//! let models = GeneratorConfig::default().build()?.into_shared();
//! let mut fleet = FleetBuilder::new(SimConfig::default(), models)
//!     .vehicles(10)
//!     .build()?;
//! let mut sink = VecSink::new();
//! fleet.run(&mut sink)?;
//! ```

pub mod builder;
pub mod error;
pub mod fleet;
pub mod profile;
pub mod record;
pub mod session;
pub mod sink;
pub mod state;

#[cfg(test)]
mod tests;

pub use builder::FleetBuilder;
pub use error::{SimError, SimResult};
pub use fleet::{Fleet, FleetReport};
pub use profile::{InitialContext, ProfileGenerator};
pub use record::{CorrectionCounters, EventRecord, LabelledRecord, SessionSummary};
pub use session::{EventStream, SessionStatus, VehicleSession};
pub use sink::{EventSink, NoopSink, VecSink};
pub use state::VehicleState;

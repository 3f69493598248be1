//! `ft-models` — the stochastic models behind each simulated vehicle.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`matrix`]    | `MarkovState` trait, `TransitionMatrix<S>`                     |
//! | [`route`]     | `RouteState` chain, `RouteModel`, GPS drift (`RoutePosition`)  |
//! | [`speed`]     | `SpeedModel` — Gaussian speed conditioned on `SpeedContext`    |
//! | [`driver`]    | `DriverState` HMM: transitions, emissions, posterior           |
//! | [`incident`]  | `IncidentModel` — Poisson counts, λ floor, incident details    |
//! | [`telemetry`] | AR(1) sensor channels                                          |
//! | [`engine`]    | RPM, throttle and fuel readings                                |
//! | [`context`]   | Environment enums and per-tick contexts                        |
//! | [`policy`]    | Conditioning factor tables, `Gaussian` parameters              |
//! | [`config`]    | `GeneratorConfig` (JSON) → validated `ModelSet`                |
//! | [`stats`]     | Sample statistics for calibration checks                       |
//! | [`error`]     | `ModelError`, `ModelResult<T>`                                 |
//!
//! # Design notes
//!
//! Every model is a pure function of `(state, context, rng)`.  Models never
//! look into each other: the session reads one model's output and passes it
//! to the next inside an explicit context value.  All parameters are
//! validated when the `ModelSet` is built, so sampling never fails on
//! configuration grounds.

pub mod config;
pub mod context;
pub mod driver;
pub mod engine;
pub mod error;
pub mod incident;
pub mod matrix;
pub mod policy;
pub mod route;
pub mod speed;
pub mod stats;
pub mod telemetry;


pub use config::{GeneratorConfig, ModelSet, TransitionMatricesConfig};
pub use context::{Experience, IncidentContext, RoadType, SpeedContext, TimeOfDay, Traffic, Weather};
pub use driver::{DriverModel, DriverObservation, DriverState, EmissionParams};
pub use engine::{EngineInputs, EngineModel, EngineParams, EngineReading};
pub use error::{ModelError, ModelResult};
pub use incident::{IncidentDetail, IncidentKind, IncidentModel, IncidentSample, LambdaEstimate, PoissonRiskFactors, Severity};
pub use matrix::{MarkovState, TransitionMatrix};
pub use policy::{Gaussian, SpeedPolicy};
pub use route::{RouteModel, RoutePosition, RouteState};
pub use speed::{SpeedModel, SpeedParams, SpeedSample, MIN_CLAMP_HEADROOM_SIGMA};
pub use telemetry::{Ar1Params, Channel, Readings, TelemetryModel};

//! `ft-core` — foundational types for the `fleet_twin` telemetry generator.
//!
//! This crate is a dependency of every other `ft-*` crate.  It intentionally
//! has no `ft-*` dependencies and minimal external ones (`rand`,
//! `rand_distr` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VehicleId`, `DriverId`                               |
//! | [`geo`]         | `GeoPoint`, haversine distance, great-circle stepping |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]         | `VehicleRng` (per-vehicle), `SimRng` (fleet-level)    |
//! | [`error`]       | `FtError`, `FtResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `ft-sim` for event records.                    |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{FtError, FtResult};
pub use geo::GeoPoint;
pub use ids::{DriverId, VehicleId};
pub use rng::{SimRng, VehicleRng};
pub use time::{SimClock, SimConfig, Tick};

//! Deterministic per-vehicle and fleet-level RNG wrappers, plus the sampling
//! primitives every model draws from.
//!
//! # Determinism strategy
//!
//! Each vehicle gets its own independent `SmallRng` seeded by:
//!
//!   seed = master_seed XOR (vehicle_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive vehicle IDs uniformly across the seed space.
//! This means:
//!
//! - Vehicles never share RNG state (no contention, no ordering dependency).
//! - Adding vehicles at the end of the fleet does not disturb the streams of
//!   existing vehicles.
//! - All RNG calls are local to the owning thread; no synchronisation needed.
//!
//! # Sampling primitives
//!
//! [`Sampler`] supplies uniform, normal, Poisson and categorical draws on top
//! of any wrapped `SmallRng`.  Normal draws use `rand_distr::StandardNormal`
//! (exact ziggurat sampler); Poisson draws use `rand_distr::Poisson`, which
//! switches from direct multiplication to transformed rejection for large
//! λ, so it stays exact and overflow-free well beyond λ = 50.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson, StandardNormal};

use crate::{FtError, FtResult, VehicleId};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── Sampler ───────────────────────────────────────────────────────────────────

/// Distribution primitives shared by [`VehicleRng`] and [`SimRng`].
///
/// Implementors only provide [`inner`][Self::inner]; every draw is a
/// provided method so both stream types sample identically.
pub trait Sampler {
    /// The wrapped generator, for use with other `rand` distribution types.
    fn inner(&mut self) -> &mut SmallRng;

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.inner().r#gen::<f64>()
    }

    /// Uniform `f64` in `[low, high)`.  Returns `low` when the range is empty.
    #[inline]
    fn uniform_range(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.inner().gen_range(low..high)
    }

    /// One draw from N(0, 1).
    #[inline]
    fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(self.inner())
    }

    /// One draw from N(mean, std²), computed as `mean + std·Z`.
    ///
    /// `std` is expected to be validated (finite, ≥ 0) by the caller's
    /// configuration layer; a zero `std` returns `mean` exactly.
    #[inline]
    fn normal(&mut self, mean: f64, std: f64) -> f64 {
        debug_assert!(std >= 0.0 && std.is_finite(), "normal std must be finite and >= 0");
        mean + std * self.standard_normal()
    }

    /// One draw from Poisson(λ).
    ///
    /// `λ = 0` yields 0 without consuming randomness.  Negative or non-finite
    /// λ is rejected rather than silently corrected; rate flooring is the
    /// incident model's policy, not the sampler's.
    fn poisson(&mut self, lambda: f64) -> FtResult<u64> {
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(FtError::Distribution(format!(
                "poisson rate must be finite and >= 0, got {lambda}"
            )));
        }
        if lambda == 0.0 {
            return Ok(0);
        }
        let dist = Poisson::new(lambda)
            .map_err(|e| FtError::Distribution(format!("poisson({lambda}): {e}")))?;
        let draw: f64 = dist.sample(self.inner());
        Ok(draw as u64)
    }

    /// Draw an index from the categorical distribution proportional to
    /// `weights`.
    ///
    /// Zero-weight entries are never selected.  If floating-point rounding
    /// leaves the uniform draw past the final cumulative sum, the last
    /// positive-weight index is returned, so a row with a single non-zero
    /// entry always yields that entry.  Returns `None` when no weight is
    /// positive.
    fn categorical(&mut self, weights: &[f64]) -> Option<usize> {
        let last_positive = weights.iter().rposition(|&w| w > 0.0)?;
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        let target = self.uniform() * total;

        let mut cumulative = 0.0;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            cumulative += w;
            if target < cumulative {
                return Some(i);
            }
        }
        Some(last_positive)
    }
}

// ── VehicleRng ────────────────────────────────────────────────────────────────

/// Per-vehicle deterministic RNG sub-stream.
///
/// Created once per vehicle session at `start` and owned by that session's
/// `VehicleState`.  The type is `Send` but never shared: a session (and so its
/// stream) is only ever advanced from one execution context at a time.
#[derive(Clone, Debug)]
pub struct VehicleRng(SmallRng);

impl VehicleRng {
    /// Seed deterministically from the run's master seed and a vehicle ID.
    pub fn new(master_seed: u64, vehicle: VehicleId) -> Self {
        let seed = master_seed ^ (vehicle.0 as u64).wrapping_mul(MIXING_CONSTANT);
        VehicleRng(SmallRng::seed_from_u64(seed))
    }
}

impl Sampler for VehicleRng {
    #[inline]
    fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Fleet-level RNG for global operations (profile assignment, environment
/// draws).
///
/// Used only in single-threaded contexts.  Parallel work receives its own
/// [`VehicleRng`] per vehicle instead.
#[derive(Clone, Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }
}

impl Sampler for SimRng {
    #[inline]
    fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}

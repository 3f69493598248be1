//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter.  The
//! mapping to wall-clock time is held in `SimClock`:
//!
//!   wall_time = start_unix_secs + tick * tick_duration_secs
//!
//! Using an integer tick as the canonical time unit means all interval
//! arithmetic is exact (no floating-point drift) and comparisons are O(1).
//!
//! The default tick duration is 60 s (one telemetry sample per simulated
//! minute).  Every model that integrates over a tick (position, incident
//! rate, fuel burn) reads the interval from the clock, so any resolution
//! works.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and Unix wall-clock seconds.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.  Each
/// vehicle session owns its own clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// How many real seconds one tick represents.
    pub tick_duration_secs: u32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    /// Create a clock starting at `start_unix_secs` with the given resolution.
    pub fn new(start_unix_secs: i64, tick_duration_secs: u32) -> Self {
        Self {
            start_unix_secs,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Current Unix timestamp corresponding to `current_tick`.
    #[inline]
    pub fn current_unix_secs(&self) -> i64 {
        self.start_unix_secs + self.elapsed_secs()
    }

    /// Length of one tick in hours.
    #[inline]
    pub fn tick_hours(&self) -> f64 {
        self.tick_duration_secs as f64 / 3_600.0
    }

    /// UTC hour of day (0–23) at `current_tick`.
    #[inline]
    pub fn hour_of_day(&self) -> u32 {
        (self.current_unix_secs().rem_euclid(86_400) / 3_600) as u32
    }

    /// Break elapsed time into (day, hour, minute) components from sim start.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = self.elapsed_secs().max(0) as u64;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-level configuration shared by every vehicle session.
///
/// Model parameters live in `ft_models::GeneratorConfig`; this struct only
/// covers the clock, the run bound and the master seed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Unix timestamp for tick 0.
    pub start_unix_secs: i64,

    /// Seconds per tick.  Default: 60.
    pub tick_duration_secs: u32,

    /// Upper bound on ticks per vehicle session.  A session completes at
    /// this bound even if the delivery has not been reached.
    pub max_ticks: u64,

    /// Master RNG seed.  Every vehicle sub-stream is derived from it, so the
    /// same seed always produces identical records.
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Complete a session as soon as its route reaches the customer state.
    pub stop_on_delivery: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_unix_secs:    1_700_000_000,
            tick_duration_secs: 60,
            max_ticks:          480,
            seed:               42,
            num_threads:        None,
            stop_on_delivery:   true,
        }
    }
}

impl SimConfig {
    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_unix_secs, self.tick_duration_secs)
    }
}

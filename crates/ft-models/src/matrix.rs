//! Row-stochastic transition matrices over a finite state enum.
//!
//! Both Markov components (route and driver) share this type.  A matrix is
//! validated once at construction and is read-only afterwards, so a single
//! instance can be shared across every vehicle session without locking.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use ft_core::rng::Sampler;

use crate::{ModelError, ModelResult};

/// Maximum allowed deviation of a row sum from 1.
pub const ROW_TOLERANCE: f64 = 1e-9;

/// A finite state space usable as the index set of a [`TransitionMatrix`].
///
/// `ALL` lists the states in canonical order; `index()` must return a
/// state's position in `ALL`.
pub trait MarkovState: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Matrix name used in error messages ("route", "driver").
    const SPACE: &'static str;

    fn index(self) -> usize;

    /// Canonical lower-case name, also the config key for the state's row.
    fn name(self) -> &'static str;

    #[inline]
    fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

/// `P[i][j] = P(next = j | current = i)` over the states of `S`.
#[derive(Clone, PartialEq)]
pub struct TransitionMatrix<S: MarkovState> {
    rows:   Vec<Vec<f64>>,
    _state: PhantomData<S>,
}

impl<S: MarkovState> TransitionMatrix<S> {
    /// Validate and wrap `rows`, given in `S::ALL` order.
    ///
    /// Fails fast on wrong dimensions, negative or non-finite entries, rows
    /// that sum to zero and rows whose sum is off 1 by more than
    /// [`ROW_TOLERANCE`].  Nothing is renormalised.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> ModelResult<Self> {
        let n = S::ALL.len();
        if rows.len() != n {
            return Err(ModelError::Dimension {
                what:     format!("{} transition matrix rows", S::SPACE),
                expected: n,
                got:      rows.len(),
            });
        }

        for (state, row) in S::ALL.iter().zip(&rows) {
            if row.len() != n {
                return Err(ModelError::Dimension {
                    what:     format!("{} transition row `{}`", S::SPACE, state.name()),
                    expected: n,
                    got:      row.len(),
                });
            }
            validate_distribution(S::SPACE, state.name(), row)?;
        }

        Ok(Self { rows, _state: PhantomData })
    }

    /// Build from a config map keyed by state name.  Every state needs a row
    /// and unknown keys are rejected.
    pub fn from_named_rows(named: &BTreeMap<String, Vec<f64>>) -> ModelResult<Self> {
        if let Some(unknown) = named.keys().find(|k| S::from_name(k).is_none()) {
            return Err(ModelError::Config(format!(
                "unknown {} state `{unknown}` in transition matrix",
                S::SPACE
            )));
        }
        let rows = S::ALL
            .iter()
            .map(|s| {
                named.get(s.name()).cloned().ok_or_else(|| {
                    ModelError::Config(format!(
                        "{} transition matrix is missing the row for `{}`",
                        S::SPACE,
                        s.name()
                    ))
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;
        Self::from_rows(rows)
    }

    /// The categorical distribution over next states given `from`.
    #[inline]
    pub fn row(&self, from: S) -> &[f64] {
        &self.rows[from.index()]
    }

    #[inline]
    pub fn probability(&self, from: S, to: S) -> f64 {
        self.rows[from.index()][to.index()]
    }

    /// All rows in `S::ALL` order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Sample the successor of `from`.
    pub fn sample_next<R: Sampler>(&self, from: S, rng: &mut R) -> S {
        rng.categorical(self.row(from))
            .and_then(S::from_index)
            // Validated rows always have a positive entry.
            .unwrap_or(from)
    }

    /// One step of the distribution recurrence: `dist · P`.
    pub fn propagate(&self, dist: &[f64]) -> Vec<f64> {
        let n = S::ALL.len();
        let mut next = vec![0.0; n];
        for (i, &p_i) in dist.iter().enumerate().take(n) {
            for (j, next_j) in next.iter_mut().enumerate() {
                *next_j += p_i * self.rows[i][j];
            }
        }
        next
    }

    /// The stationary distribution π with `π · P = π`.
    ///
    /// Computed by power iteration on the lazy chain `(I + P) / 2`, which has
    /// the same stationary distribution but is aperiodic, so the iteration
    /// converges for every irreducible chain.  For reducible chains the
    /// result is the limit reached from the uniform start.
    pub fn stationary_distribution(&self) -> Vec<f64> {
        let n = S::ALL.len();
        let mut dist = vec![1.0 / n as f64; n];
        for _ in 0..100_000 {
            let stepped = self.propagate(&dist);
            let next: Vec<f64> = dist
                .iter()
                .zip(&stepped)
                .map(|(a, b)| 0.5 * (a + b))
                .collect();
            let delta: f64 = next.iter().zip(&dist).map(|(a, b)| (a - b).abs()).sum();
            dist = next;
            if delta < 1e-14 {
                break;
            }
        }
        dist
    }
}

impl<S: MarkovState> fmt::Debug for TransitionMatrix<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut m = f.debug_map();
        for (s, row) in S::ALL.iter().zip(&self.rows) {
            m.entry(&s.name(), row);
        }
        m.finish()
    }
}

/// Check that `probs` is a valid categorical distribution: every entry finite
/// and ≥ 0, positive total, total within [`ROW_TOLERANCE`] of 1.
pub fn validate_distribution(
    matrix: &'static str,
    state:  &'static str,
    probs:  &[f64],
) -> ModelResult<()> {
    if let Some(&bad) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(ModelError::InvalidProbability { matrix, state, value: bad });
    }
    let sum: f64 = probs.iter().sum();
    if sum <= 0.0 {
        return Err(ModelError::DegenerateRow { matrix, state });
    }
    if (sum - 1.0).abs() > ROW_TOLERANCE {
        return Err(ModelError::RowSum { matrix, state, sum });
    }
    Ok(())
}

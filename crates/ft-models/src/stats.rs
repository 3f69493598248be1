//! Sample statistics for checking generated series against their models.

use crate::matrix::MarkovState;

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population variance.
pub fn variance(xs: &[f64]) -> f64 {
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64
}

/// Sample autocorrelation at `lag`.  `NaN` for a constant or too-short
/// series.
pub fn autocorrelation(xs: &[f64], lag: usize) -> f64 {
    if xs.len() <= lag {
        return f64::NAN;
    }
    let m = mean(xs);
    let denom: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    let num: f64 = xs
        .iter()
        .zip(&xs[lag..])
        .map(|(a, b)| (a - m) * (b - m))
        .sum();
    num / denom
}

/// Fraction of `xs` within `k` standard deviations of `mu`.
pub fn fraction_within(xs: &[f64], mu: f64, sigma: f64, k: f64) -> f64 {
    let inside = xs.iter().filter(|x| (**x - mu).abs() <= k * sigma).count();
    inside as f64 / xs.len() as f64
}

/// Variance-to-mean ratio.  1 for Poisson counts.
pub fn dispersion_index(counts: &[u64]) -> f64 {
    let xs: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    variance(&xs) / mean(&xs)
}

/// Fraction of time spent in each state, in `S::ALL` order.
pub fn occupancy<S: MarkovState>(states: &[S]) -> Vec<f64> {
    let mut counts = vec![0usize; S::ALL.len()];
    for s in states {
        counts[s.index()] += 1;
    }
    let n = states.len().max(1) as f64;
    counts.into_iter().map(|c| c as f64 / n).collect()
}

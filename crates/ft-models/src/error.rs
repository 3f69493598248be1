use thiserror::Error;

/// Configuration and sampling errors raised by the model layer.
///
/// Every variant except `Sampling` is a load-time error: a `ModelSet` that
/// was built successfully never produces them mid-simulation.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{matrix} transition row for `{state}` is degenerate (sums to zero)")]
    DegenerateRow {
        matrix: &'static str,
        state:  &'static str,
    },

    #[error("{matrix} transition row for `{state}` sums to {sum}, expected 1")]
    RowSum {
        matrix: &'static str,
        state:  &'static str,
        sum:    f64,
    },

    #[error("{matrix} probability for `{state}` is negative or not finite: {value}")]
    InvalidProbability {
        matrix: &'static str,
        state:  &'static str,
        value:  f64,
    },

    #[error("{what}: expected {expected} entries, got {got}")]
    Dimension {
        what:     String,
        expected: usize,
        got:      usize,
    },

    #[error("telemetry channel `{channel}` has |phi| = {phi} >= 1 (non-stationary)")]
    NonStationary {
        channel: String,
        phi:     f64,
    },

    #[error("{what} must be a finite value > 0, got {value}")]
    InvalidVariance {
        what:  String,
        value: f64,
    },

    #[error("{what} must be a finite value >= 0, got {value}")]
    InvalidRate {
        what:  String,
        value: f64,
    },

    #[error("model configuration error: {0}")]
    Config(String),

    #[error("sampling error: {0}")]
    Sampling(#[from] ft_core::FtError),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;

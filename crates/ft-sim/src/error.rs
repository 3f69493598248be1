use ft_models::ModelError;
use thiserror::Error;

use crate::session::SessionStatus;

#[derive(Debug, Error)]
pub enum SimError {
    /// A session operation was called in a state that does not allow it,
    /// e.g. `tick` before `start` or after completion.
    #[error("cannot {op} a session that is {status}")]
    InvalidState {
        op:     &'static str,
        status: SessionStatus,
    },

    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match vehicle count {expected}")]
    ProfileCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

pub type SimResult<T> = Result<T, SimError>;

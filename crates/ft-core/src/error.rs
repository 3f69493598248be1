//! Framework error type.
//!
//! Sub-crates define their own error enums (`ModelError`, `SimError`,
//! `OutputError`) and convert into or wrap `FtError` where it keeps error
//! sites clean.

use thiserror::Error;

/// Errors raised by the `ft-core` primitives.
#[derive(Debug, Error)]
pub enum FtError {
    #[error("invalid distribution parameter: {0}")]
    Distribution(String),
}

/// Shorthand result type for all `ft-*` crates.
pub type FtResult<T> = Result<T, FtError>;

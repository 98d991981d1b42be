//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one variant
//! via `#[from]`, so configuration problems surface unchanged at the top of
//! a run.

use thiserror::Error;

use crate::{AgentId, StationId};

/// The top-level error type for `sky-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("station {0} not found")]
    StationNotFound(StationId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `sky-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;

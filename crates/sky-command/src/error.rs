use thiserror::Error;

use sky_core::{CommandId, StationId};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command {0:?} was updated or predicted before initialize()")]
    NotInitialized(CommandId),

    #[error("command {0:?} was initialized before bind()")]
    NotBound(CommandId),

    #[error("charge command names unknown station {0:?}")]
    UnknownStation(StationId),

    #[error("invalid command: {0}")]
    Invalid(String),
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("line {line}: unsupported command code {code}")]
    UnsupportedCommand { code: u16, line: u64 },
}

pub type LoaderResult<T> = Result<T, LoaderError>;

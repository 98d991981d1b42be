use thiserror::Error;

use sky_core::{AgentId, CoreError};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no agent available to replace {0:?}")]
    NoAgentsAvailable(AgentId),

    #[error("agent {0:?} is already registered")]
    DuplicateAgent(AgentId),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

use thiserror::Error;

use sky_command::CommandError;
use sky_core::AgentId;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {0:?} received exchange data without an active exchange command")]
    NoActiveCommand(AgentId),

    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

pub type AgentResult<T> = Result<T, AgentError>;

use thiserror::Error;

use sky_agent::AgentError;
use sky_core::CoreError;
use sky_energy::EnergyError;
use sky_scheduler::SchedulerError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("energy model error: {0}")]
    Energy(#[from] EnergyError),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

pub type SimResult<T> = Result<T, SimError>;

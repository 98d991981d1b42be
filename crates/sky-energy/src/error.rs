use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnergyError {
    #[error("invalid charge model: {0}")]
    InvalidModel(String),
}

pub type EnergyResult<T> = Result<T, EnergyError>;

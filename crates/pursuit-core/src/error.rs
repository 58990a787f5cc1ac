use thiserror::Error;

use crate::Position;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("insufficient free cells: {free} free, {requested} agents requested")]
    InsufficientFreeCells { free: usize, requested: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid placement at {position}: {reason}")]
    InvalidPlacement {
        position: Position,
        reason: &'static str,
    },
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SimError> = core::result::Result<T, E>;

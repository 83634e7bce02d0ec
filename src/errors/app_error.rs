use cov_core::constants::EXIT_FATAL;
use cov_core::{CoreError, TrustError};
use cov_persistence::PersistenceError;
use thiserror::Error;

use super::ConfigError;

/// Error fatal de una ejecución: la corrida no llegó a producir un reporte.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trust(#[from] TrustError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        EXIT_FATAL
    }
}

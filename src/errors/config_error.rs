use cov_core::TrustError;
use cov_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error de configuración: {0}")]
    Invalid(String),
    #[error("Variable de entorno inválida {var}={value:?}: {reason}")]
    InvalidEnv { var: String, value: String, reason: String },
    #[error("Falta el prefijo de artifacts (--prefix o COVFLOW_PREFIX)")]
    MissingPrefix,
    #[error(transparent)]
    Trust(#[from] TrustError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

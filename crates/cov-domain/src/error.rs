// error.rs
use thiserror::Error;

/// Error del dominio de cobertura (artifacts, filtros, directorios de salida)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    ValidationError(String),
}

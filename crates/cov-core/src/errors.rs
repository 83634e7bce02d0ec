//! Errores del core.

use std::path::PathBuf;

use cov_domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("discovery failed for {}: {reason}", path.display())]
    Discovery { path: PathBuf, reason: String },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Trust(#[from] TrustError),
    #[error("failed to launch {program}: {reason}")]
    Spawn { program: String, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("internal: {0}")]
    Internal(String),
}

/// Violaciones de la frontera de confianza del uploader. Nunca se reintentan.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum TrustError {
    #[error("remote uploader locations are not allowed: {0}")]
    RemoteUploader(String),
    #[error("uploader not found or not a regular file: {0}")]
    MissingUploader(String),
    #[error("uploader checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch { path: String, expected: String, actual: String },
}

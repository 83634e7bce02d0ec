use std::path::PathBuf;
use std::time::Duration;

use cov_domain::ArtifactFilter;
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Cuándo se ejecuta el paso de upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadPolicy {
    /// No se sube nada (`UploadOutcome::NotRequested`).
    Disabled,
    /// Se sube siempre tras la instrumentación, incluso sin artifacts.
    Always,
    /// Como `Always`, pero sin artifacts se registra `UploadSkipped`.
    SkipWhenEmpty,
}

/// Parámetros de una corrida.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub build_dir: PathBuf,
    pub coverage_dir: PathBuf,
    pub filter: ArtifactFilter,
    pub upload: UploadPolicy,
    /// Política (a): el primer fallo omite los artifacts restantes y el upload.
    pub fail_fast: bool,
    /// Instrumentaciones concurrentes; 1 = secuencial.
    pub jobs: usize,
    /// Timeout por artifact; también acota cada intento de upload.
    pub artifact_timeout: Option<Duration>,
    pub run_timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl RunSettings {
    pub fn new(build_dir: impl Into<PathBuf>, coverage_dir: impl Into<PathBuf>, filter: ArtifactFilter) -> Self {
        Self { build_dir: build_dir.into(),
               coverage_dir: coverage_dir.into(),
               filter,
               upload: UploadPolicy::Always,
               fail_fast: false,
               jobs: 1,
               artifact_timeout: None,
               run_timeout: None,
               retry: RetryPolicy::none() }
    }
}

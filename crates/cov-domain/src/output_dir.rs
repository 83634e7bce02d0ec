//! Directorio de salida de cobertura de un artifact.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Ruta derivada de forma determinista: `<coverage_root>/<base_name>`.
///
/// Durante el procesamiento de un artifact el directorio pertenece
/// exclusivamente a ese artifact; persiste al terminar la corrida porque lo
/// consume el paso de upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageOutputDir {
    root: PathBuf,
    path: PathBuf,
}

impl CoverageOutputDir {
    pub fn new(coverage_root: &Path, base_name: &str) -> Self {
        Self { root: coverage_root.to_path_buf(),
               path: coverage_root.join(base_name) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

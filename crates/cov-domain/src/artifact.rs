//! Artifact: binario de test construido, candidato a medición de cobertura.
//!
//! Se descubre al inicio de la corrida listando el directorio de build y no se
//! muta después. El `base_name` es la identidad del artifact dentro de una
//! corrida y determina su directorio de salida.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::output_dir::CoverageOutputDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    path: PathBuf,
    base_name: String,
    executable: bool,
}

impl Artifact {
    /// Crea un artifact a partir de su ruta. Falla si la ruta no termina en un
    /// nombre de archivo UTF-8 (no podríamos derivar el directorio de salida).
    pub fn new(path: impl Into<PathBuf>, executable: bool) -> Result<Self, DomainError> {
        let path = path.into();
        let base_name = path.file_name()
                            .and_then(|n| n.to_str())
                            .map(str::to_string)
                            .ok_or_else(|| {
                                DomainError::ValidationError(format!("ruta sin nombre de archivo válido: {}",
                                                                     path.display()))
                            })?;
        Ok(Self { path, base_name, executable })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Permiso de ejecución para el usuario actual, tal como se observó al
    /// descubrir el archivo.
    pub fn is_executable(&self) -> bool {
        self.executable
    }

    /// Directorio de salida `<coverage_root>/<base_name>`.
    pub fn output_dir(&self, coverage_root: &Path) -> CoverageOutputDir {
        CoverageOutputDir::new(coverage_root, &self.base_name)
    }
}

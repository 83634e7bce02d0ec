//! Filtro de elegibilidad de artifacts.
use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::error::DomainError;

/// Selecciona archivos cuyo nombre empieza con un prefijo fijo y que además
/// son ejecutables (p. ej. `app-` acepta `app-abc123` pero no `app-abc123.d`,
/// que no tiene permiso de ejecución).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFilter {
    prefix: String,
}

impl ArtifactFilter {
    pub fn new(prefix: impl Into<String>) -> Result<Self, DomainError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(DomainError::ValidationError("el prefijo no puede estar vacío".into()));
        }
        if prefix.contains('/') || prefix.contains('\\') {
            return Err(DomainError::ValidationError(format!("el prefijo no puede contener separadores de ruta: {prefix}")));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches_name(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }

    pub fn accepts(&self, artifact: &Artifact) -> bool {
        artifact.is_executable() && self.matches_name(artifact.base_name())
    }
}

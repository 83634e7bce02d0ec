use std::path::Path;
use std::time::Duration;

use super::ExecOutcome;
use crate::errors::{CoreError, TrustError};

/// Paso de upload agregado: transmite el directorio de cobertura completo a un
/// servicio externo.
pub trait Uploader {
    /// Verificación de confianza previa a cada ejecución (ubicación local,
    /// checksum). Un `Err` impide ejecutar y no se reintenta.
    fn verify(&self) -> Result<(), TrustError>;

    /// Línea de comando que se ejecutaría (para `--dry-run` y logs).
    fn command_line(&self, coverage_root: &Path) -> Vec<String>;

    fn upload(&self, coverage_root: &Path, timeout: Option<Duration>) -> Result<ExecOutcome, CoreError>;
}

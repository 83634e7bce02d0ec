use std::time::Duration;

use cov_domain::{Artifact, CoverageOutputDir};

use super::ExecOutcome;
use crate::errors::CoreError;

/// Herramienta de instrumentación de cobertura (caja negra).
///
/// `Send + Sync` porque con `jobs > 1` se invoca desde varios hilos a la vez;
/// cada invocación escribe en un directorio de salida distinto.
pub trait Instrumenter: Send + Sync {
    /// Nombre para logs.
    fn name(&self) -> &str;

    /// Línea de comando que se ejecutaría (para `--dry-run` y logs).
    fn command_line(&self, artifact: &Artifact, out_dir: &CoverageOutputDir) -> Vec<String>;

    /// Ejecuta el artifact bajo instrumentación. `Err` sólo si el comando no
    /// pudo lanzarse o esperarse; un exit code distinto de cero es `Ok`.
    fn instrument(&self,
                  artifact: &Artifact,
                  out_dir: &CoverageOutputDir,
                  timeout: Option<Duration>)
                  -> Result<ExecOutcome, CoreError>;
}

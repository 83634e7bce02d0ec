//! Tipos de evento de una corrida y estructura `RunEvent`.
//!
//! Rol en la corrida:
//! - El `CoverageRunner` emite eventos a un `EventStore` append-only.
//! - `RunReport::from_events` reconstruye el resultado agregado (replay), de
//!   modo que el log persistido y el reporte no pueden divergir.
//! - `index` es la posición del artifact en el orden de discovery.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Referencia serializable a un artifact descubierto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub name: String,
    pub path: String,
}

/// Motivo por el cual un artifact o el upload no se ejecutó.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No se descubrió ningún artifact y el upload se configuró para omitirse.
    NoArtifacts,
    /// Se agotó el deadline global de la corrida.
    RunDeadline,
    /// Un artifact previo falló con `fail_fast` activo.
    FailFast,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::NoArtifacts => "no artifacts",
            SkipReason::RunDeadline => "run deadline exceeded",
            SkipReason::FailFast => "fail-fast after earlier failure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Primer evento de toda corrida. Fija las rutas y el prefijo usados.
    RunInitialized { build_dir: String, coverage_dir: String, prefix: String },
    /// Resultado del discovery, en el orden en que se procesarán.
    ArtifactsDiscovered { artifacts: Vec<ArtifactRef> },
    InstrumentationStarted { index: usize, artifact: String, output_dir: String },
    InstrumentationFinished { index: usize, artifact: String, duration_ms: u64 },
    /// Fallo de un artifact: exit code distinto de cero, muerte por señal
    /// (`exit_code = None`), timeout o error al preparar/lanzar el comando.
    InstrumentationFailed {
        index: usize,
        artifact: String,
        exit_code: Option<i32>,
        timed_out: bool,
        error: Option<String>,
        duration_ms: u64,
    },
    ArtifactSkipped { index: usize, artifact: String, reason: SkipReason },
    UploadStarted { attempt: u32 },
    /// Intento fallido que será reintentado.
    UploadAttemptFailed { attempt: u32, error: String },
    UploadFinished { attempts: u32 },
    /// Fallo terminal del upload (sin más reintentos).
    UploadFailed { attempts: u32, error: String },
    UploadSkipped { reason: SkipReason },
    /// Cierre de la corrida con el código de salida agregado.
    RunCompleted { success: bool, exit_code: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>,
}

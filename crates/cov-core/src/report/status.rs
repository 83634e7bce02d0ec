use serde::{Deserialize, Serialize};

/// Estado de un artifact durante la corrida.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Running`
/// - `Running` -> `Succeeded` | `Failed` | `TimedOut`
/// - `Pending` -> `Skipped`
///
/// No se permiten reversiones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    TimedOut,
    /// Nunca se ejecutó (deadline o fail-fast).
    Skipped,
}

impl ArtifactStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ArtifactStatus::Pending | ArtifactStatus::Running)
    }
}

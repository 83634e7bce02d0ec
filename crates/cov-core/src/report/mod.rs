//! Reporte agregado de una corrida, reconstruido a partir de eventos.
//!
//! El replay es lineal: se consumen los eventos en orden de `seq` y se
//! actualiza el estado de cada artifact. Un reporte de una corrida
//! interrumpida (sin `RunCompleted`) sigue siendo válido: los artifacts no
//! alcanzados quedan en `Pending` y cuentan como no procesados.

mod status;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{EXIT_INSTRUMENTATION_FAILED, EXIT_UPLOAD_FAILED};
use crate::event::{RunEvent, RunEventKind, SkipReason};

pub use status::ArtifactStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactOutcome {
    pub name: String,
    pub path: String,
    pub output_dir: String,
    pub status: ArtifactStatus,
    pub exit_code: Option<i32>,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
    pub skip_reason: Option<SkipReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadOutcome {
    /// Upload deshabilitado por configuración.
    NotRequested,
    Skipped { reason: SkipReason },
    /// Hubo `UploadStarted` sin evento terminal (corrida interrumpida).
    InProgress { attempts: u32 },
    Succeeded { attempts: u32 },
    Failed { attempts: u32, error: String },
}

impl UploadOutcome {
    /// `Skipped` por falta de artifacts o por fail-fast no cuenta como fallo del
    /// upload (en fail-fast el fallo ya lo refleja la instrumentación).
    pub fn is_ok(&self) -> bool {
        match self {
            UploadOutcome::NotRequested | UploadOutcome::Succeeded { .. } => true,
            UploadOutcome::Skipped { reason } => !matches!(reason, SkipReason::RunDeadline),
            UploadOutcome::InProgress { .. } | UploadOutcome::Failed { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub build_dir: String,
    pub coverage_dir: String,
    pub prefix: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub artifacts: Vec<ArtifactOutcome>,
    pub upload: UploadOutcome,
    pub completed: bool,
}

impl RunReport {
    /// Replay de los eventos de `run_id` (se ignoran eventos de otras corridas).
    pub fn from_events(run_id: Uuid, events: &[RunEvent]) -> Self {
        let mut report = RunReport { run_id,
                                     build_dir: String::new(),
                                     coverage_dir: String::new(),
                                     prefix: String::new(),
                                     started_at: None,
                                     finished_at: None,
                                     artifacts: Vec::new(),
                                     upload: UploadOutcome::NotRequested,
                                     completed: false };
        for ev in events.iter().filter(|e| e.run_id == run_id) {
            match &ev.kind {
                RunEventKind::RunInitialized { build_dir,
                                               coverage_dir,
                                               prefix } => {
                    report.build_dir = build_dir.clone();
                    report.coverage_dir = coverage_dir.clone();
                    report.prefix = prefix.clone();
                    report.started_at = Some(ev.ts);
                }
                RunEventKind::ArtifactsDiscovered { artifacts } => {
                    let root = Path::new(&report.coverage_dir);
                    report.artifacts = artifacts.iter()
                                                .map(|a| ArtifactOutcome { name: a.name.clone(),
                                                                           path: a.path.clone(),
                                                                           output_dir: root.join(&a.name)
                                                                                           .display()
                                                                                           .to_string(),
                                                                           status: ArtifactStatus::Pending,
                                                                           exit_code: None,
                                                                           duration_ms: None,
                                                                           error: None,
                                                                           skip_reason: None })
                                                .collect();
                }
                RunEventKind::InstrumentationStarted { index, output_dir, .. } => {
                    if let Some(slot) = report.artifacts.get_mut(*index) {
                        slot.status = ArtifactStatus::Running;
                        slot.output_dir = output_dir.clone();
                    }
                }
                RunEventKind::InstrumentationFinished { index, duration_ms, .. } => {
                    if let Some(slot) = report.artifacts.get_mut(*index) {
                        slot.status = ArtifactStatus::Succeeded;
                        slot.exit_code = Some(0);
                        slot.duration_ms = Some(*duration_ms);
                    }
                }
                RunEventKind::InstrumentationFailed { index,
                                                      exit_code,
                                                      timed_out,
                                                      error,
                                                      duration_ms,
                                                      .. } => {
                    if let Some(slot) = report.artifacts.get_mut(*index) {
                        slot.status = if *timed_out { ArtifactStatus::TimedOut } else { ArtifactStatus::Failed };
                        slot.exit_code = *exit_code;
                        slot.error = error.clone();
                        slot.duration_ms = Some(*duration_ms);
                    }
                }
                RunEventKind::ArtifactSkipped { index, reason, .. } => {
                    if let Some(slot) = report.artifacts.get_mut(*index) {
                        slot.status = ArtifactStatus::Skipped;
                        slot.skip_reason = Some(*reason);
                    }
                }
                RunEventKind::UploadStarted { attempt } => {
                    report.upload = UploadOutcome::InProgress { attempts: *attempt };
                }
                RunEventKind::UploadAttemptFailed { .. } => {}
                RunEventKind::UploadFinished { attempts } => {
                    report.upload = UploadOutcome::Succeeded { attempts: *attempts };
                }
                RunEventKind::UploadFailed { attempts, error } => {
                    report.upload = UploadOutcome::Failed { attempts: *attempts,
                                                            error: error.clone() };
                }
                RunEventKind::UploadSkipped { reason } => {
                    report.upload = UploadOutcome::Skipped { reason: *reason };
                }
                RunEventKind::RunCompleted { .. } => {
                    report.completed = true;
                    report.finished_at = Some(ev.ts);
                }
            }
        }
        report
    }

    /// Artifacts que no terminaron en `Succeeded`.
    pub fn failures(&self) -> Vec<&ArtifactOutcome> {
        self.artifacts
            .iter()
            .filter(|a| a.status != ArtifactStatus::Succeeded)
            .collect()
    }

    pub fn succeeded_count(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.status == ArtifactStatus::Succeeded)
            .count()
    }

    /// Todos los artifacts se procesaron con éxito (vacío cuenta como éxito).
    pub fn instrumentation_ok(&self) -> bool {
        self.failures().is_empty()
    }

    /// Código de salida agregado: bit 1 = instrumentación, bit 4 = upload.
    pub fn exit_code(&self) -> u8 {
        let mut code = 0;
        if !self.instrumentation_ok() {
            code |= EXIT_INSTRUMENTATION_FAILED;
        }
        if !self.upload.is_ok() {
            code |= EXIT_UPLOAD_FAILED;
        }
        code
    }

    pub fn success(&self) -> bool {
        self.exit_code() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ArtifactRef, EventStore, InMemoryEventStore};

    fn seed(store: &mut InMemoryEventStore, run_id: Uuid, names: &[&str]) {
        store.append_kind(run_id,
                          RunEventKind::RunInitialized { build_dir: "target/debug".into(),
                                                         coverage_dir: "target/cov".into(),
                                                         prefix: "app-".into() });
        let artifacts = names.iter()
                             .map(|n| ArtifactRef { name: n.to_string(),
                                                    path: format!("target/debug/{n}") })
                             .collect();
        store.append_kind(run_id, RunEventKind::ArtifactsDiscovered { artifacts });
    }

    #[test]
    fn replay_tracks_each_artifact() {
        let mut store = InMemoryEventStore::default();
        let run_id = Uuid::new_v4();
        seed(&mut store, run_id, &["app-a", "app-b", "app-c"]);
        store.append_kind(run_id,
                          RunEventKind::InstrumentationFinished { index: 0,
                                                                  artifact: "app-a".into(),
                                                                  duration_ms: 5 });
        store.append_kind(run_id,
                          RunEventKind::InstrumentationFailed { index: 1,
                                                                artifact: "app-b".into(),
                                                                exit_code: Some(101),
                                                                timed_out: false,
                                                                error: None,
                                                                duration_ms: 7 });
        store.append_kind(run_id,
                          RunEventKind::ArtifactSkipped { index: 2,
                                                          artifact: "app-c".into(),
                                                          reason: SkipReason::RunDeadline });
        store.append_kind(run_id, RunEventKind::UploadFinished { attempts: 1 });

        let report = RunReport::from_events(run_id, &store.list(run_id));
        assert_eq!(report.artifacts.len(), 3);
        assert_eq!(report.artifacts[0].status, ArtifactStatus::Succeeded);
        assert_eq!(report.artifacts[0].output_dir, Path::new("target/cov").join("app-a").display().to_string());
        assert_eq!(report.artifacts[1].status, ArtifactStatus::Failed);
        assert_eq!(report.artifacts[1].exit_code, Some(101));
        assert_eq!(report.artifacts[2].skip_reason, Some(SkipReason::RunDeadline));
        assert_eq!(report.failures().len(), 2);
        assert_eq!(report.succeeded_count(), 1);
        assert_eq!(report.exit_code(), EXIT_INSTRUMENTATION_FAILED);
        assert!(!report.completed);
    }

    #[test]
    fn upload_failure_sets_upload_bit() {
        let mut store = InMemoryEventStore::default();
        let run_id = Uuid::new_v4();
        seed(&mut store, run_id, &[]);
        store.append_kind(run_id, RunEventKind::UploadStarted { attempt: 1 });
        store.append_kind(run_id,
                          RunEventKind::UploadFailed { attempts: 1,
                                                       error: "exit code 1".into() });
        let report = RunReport::from_events(run_id, &store.list(run_id));
        assert!(report.instrumentation_ok());
        assert_eq!(report.exit_code(), EXIT_UPLOAD_FAILED);
    }

    #[test]
    fn skipped_upload_for_empty_run_is_success() {
        let mut store = InMemoryEventStore::default();
        let run_id = Uuid::new_v4();
        seed(&mut store, run_id, &[]);
        store.append_kind(run_id, RunEventKind::UploadSkipped { reason: SkipReason::NoArtifacts });
        store.append_kind(run_id, RunEventKind::RunCompleted { success: true, exit_code: 0 });
        let report = RunReport::from_events(run_id, &store.list(run_id));
        assert!(report.success());
        assert!(report.completed);
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn interrupted_upload_is_not_ok() {
        assert!(!UploadOutcome::InProgress { attempts: 1 }.is_ok());
        assert!(!UploadOutcome::Skipped { reason: SkipReason::RunDeadline }.is_ok());
        assert!(UploadOutcome::Skipped { reason: SkipReason::FailFast }.is_ok());
    }

    #[test]
    fn pending_artifacts_count_as_failures() {
        let mut store = InMemoryEventStore::default();
        let run_id = Uuid::new_v4();
        seed(&mut store, run_id, &["app-a"]);
        let report = RunReport::from_events(run_id, &store.list(run_id));
        assert_eq!(report.artifacts[0].status, ArtifactStatus::Pending);
        assert!(!report.artifacts[0].status.is_terminal());
        assert_eq!(report.exit_code(), EXIT_INSTRUMENTATION_FAILED);
    }
}

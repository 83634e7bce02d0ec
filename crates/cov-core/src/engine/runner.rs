//! CoverageRunner: ejecución de una corrida completa.
//!
//! Flujo lineal: discover → instrument (por artifact) → upload (una vez).
//! Los fallos por artifact se registran y la corrida continúa (salvo
//! `fail_fast`); el resultado agregado se obtiene por replay de eventos.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use cov_domain::{Artifact, CoverageOutputDir};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use uuid::Uuid;

use crate::discovery::discover_artifacts;
use crate::engine::{CoverageRunnerBuilder, Deadline, RunSettings, UploadPolicy};
use crate::errors::CoreError;
use crate::event::{ArtifactRef, EventStore, RunEventKind, SkipReason};
use crate::external::{ExecOutcome, Instrumenter, Uploader};
use crate::report::RunReport;

/// Comando planificado para un artifact (`--dry-run`).
#[derive(Debug, Clone)]
pub struct PlannedArtifact {
    pub artifact: Artifact,
    pub output_dir: CoverageOutputDir,
    pub command: Vec<String>,
}

/// Lo que una corrida haría, sin ejecutar nada ni tocar el disco.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub artifacts: Vec<PlannedArtifact>,
    /// `None` cuando el upload está deshabilitado o se omitiría por falta de
    /// artifacts.
    pub upload: Option<Vec<String>>,
}

/// Resultado interno de intentar un artifact.
enum Attempt {
    Ran { outcome: ExecOutcome, duration: Duration },
    Errored { error: String, duration: Duration },
    Skipped(SkipReason),
}

impl Attempt {
    fn failed(&self) -> bool {
        match self {
            Attempt::Ran { outcome, .. } => !outcome.success(),
            Attempt::Errored { .. } | Attempt::Skipped(_) => true,
        }
    }
}

pub struct CoverageRunner<E: EventStore> {
    settings: RunSettings,
    event_store: E,
    instrumenter: Box<dyn Instrumenter>,
    uploader: Option<Box<dyn Uploader>>,
}

impl<E: EventStore> CoverageRunner<E> {
    /// Crea un builder; ver `CoverageRunnerBuilder::build` para las
    /// validaciones.
    pub fn builder(settings: RunSettings, event_store: E) -> CoverageRunnerBuilder<E> {
        CoverageRunnerBuilder::new(settings, event_store)
    }

    pub(crate) fn from_parts(settings: RunSettings,
                             event_store: E,
                             instrumenter: Box<dyn Instrumenter>,
                             uploader: Option<Box<dyn Uploader>>)
                             -> Self {
        Self { settings,
               event_store,
               instrumenter,
               uploader }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn into_event_store(self) -> E {
        self.event_store
    }

    /// Discovery + líneas de comando, sin ejecutar ni crear directorios.
    pub fn plan(&self) -> Result<RunPlan, CoreError> {
        let artifacts = discover_artifacts(&self.settings.build_dir, &self.settings.filter)?;
        let planned: Vec<PlannedArtifact> = artifacts.into_iter()
                                                     .map(|artifact| {
                                                         let output_dir = artifact.output_dir(&self.settings.coverage_dir);
                                                         let command = self.instrumenter.command_line(&artifact, &output_dir);
                                                         PlannedArtifact { artifact,
                                                                           output_dir,
                                                                           command }
                                                     })
                                                     .collect();
        let upload = match (self.settings.upload, self.uploader.as_deref()) {
            (UploadPolicy::Disabled, _) | (_, None) => None,
            (UploadPolicy::SkipWhenEmpty, Some(_)) if planned.is_empty() => None,
            (_, Some(uploader)) => Some(uploader.command_line(&self.settings.coverage_dir)),
        };
        Ok(RunPlan { artifacts: planned, upload })
    }

    /// Ejecuta la corrida completa.
    ///
    /// `Err` sólo para errores fatales previos a la instrumentación (discovery,
    /// creación del directorio de cobertura). Los fallos por artifact y del
    /// upload quedan en el `RunReport`.
    pub fn run(&mut self) -> Result<RunReport, CoreError> {
        let run_id = Uuid::new_v4();
        let deadline = Deadline::after(self.settings.run_timeout);
        info!("run:start run_id={run_id} build_dir={} coverage_dir={} prefix={}",
              self.settings.build_dir.display(),
              self.settings.coverage_dir.display(),
              self.settings.filter.prefix());

        self.event_store
            .append_kind(run_id,
                         RunEventKind::RunInitialized { build_dir: self.settings.build_dir.display().to_string(),
                                                        coverage_dir: self.settings.coverage_dir.display().to_string(),
                                                        prefix: self.settings.filter.prefix().to_string() });

        let artifacts = discover_artifacts(&self.settings.build_dir, &self.settings.filter)?;
        info!("discover:done run_id={run_id} count={}", artifacts.len());
        fs::create_dir_all(&self.settings.coverage_dir)?;

        let refs = artifacts.iter()
                            .map(|a| ArtifactRef { name: a.base_name().to_string(),
                                                   path: a.path().display().to_string() })
                            .collect();
        self.event_store
            .append_kind(run_id, RunEventKind::ArtifactsDiscovered { artifacts: refs });

        let halted = if self.settings.jobs > 1 && artifacts.len() > 1 {
            self.instrument_parallel(run_id, &artifacts, &deadline)?
        } else {
            self.instrument_sequential(run_id, &artifacts, &deadline)
        };

        self.upload_phase(run_id, artifacts.len(), halted, &deadline);

        let exit_code = RunReport::from_events(run_id, &self.event_store.list(run_id)).exit_code();
        self.event_store.append_kind(run_id,
                                     RunEventKind::RunCompleted { success: exit_code == 0,
                                                                  exit_code });
        let report = RunReport::from_events(run_id, &self.event_store.list(run_id));
        info!("run:done run_id={run_id} succeeded={} failed={} upload={:?} exit_code={exit_code}",
              report.succeeded_count(),
              report.failures().len(),
              report.upload);
        Ok(report)
    }

    /// Devuelve `true` si `fail_fast` detuvo la corrida.
    fn instrument_sequential(&mut self, run_id: Uuid, artifacts: &[Artifact], deadline: &Deadline) -> bool {
        let halted = AtomicBool::new(false);
        for (index, artifact) in artifacts.iter().enumerate() {
            let out_dir = artifact.output_dir(&self.settings.coverage_dir);
            if let Some(reason) = skip_reason(deadline, &halted) {
                self.record_attempt(run_id, index, artifact, Attempt::Skipped(reason));
                continue;
            }
            self.record_started(run_id, index, artifact, &out_dir);
            let attempt = attempt_artifact(self.instrumenter.as_ref(),
                                           artifact,
                                           &out_dir,
                                           deadline.clamp(self.settings.artifact_timeout));
            if self.record_attempt(run_id, index, artifact, attempt) && self.settings.fail_fast {
                halted.store(true, Ordering::SeqCst);
            }
        }
        halted.into_inner()
    }

    /// Instrumenta en un pool de rayon. Los eventos se registran al final, en
    /// orden de discovery, para que el log sea el mismo que en modo secuencial.
    fn instrument_parallel(&mut self,
                           run_id: Uuid,
                           artifacts: &[Artifact],
                           deadline: &Deadline)
                           -> Result<bool, CoreError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.settings.jobs)
                                                  .build()
                                                  .map_err(|e| CoreError::Internal(format!("thread pool: {e}")))?;
        debug!("instrument:parallel run_id={run_id} jobs={}", self.settings.jobs);
        let halted = AtomicBool::new(false);
        let instrumenter = self.instrumenter.as_ref();
        let coverage_dir = &self.settings.coverage_dir;
        let timeout = self.settings.artifact_timeout;
        let fail_fast = self.settings.fail_fast;

        let attempts: Vec<Attempt> = pool.install(|| {
                                             artifacts.par_iter()
                                                      .map(|artifact| {
                                                          if let Some(reason) = skip_reason(deadline, &halted) {
                                                              return Attempt::Skipped(reason);
                                                          }
                                                          let out_dir = artifact.output_dir(coverage_dir);
                                                          let attempt = attempt_artifact(instrumenter,
                                                                                         artifact,
                                                                                         &out_dir,
                                                                                         deadline.clamp(timeout));
                                                          if fail_fast && attempt.failed() {
                                                              halted.store(true, Ordering::SeqCst);
                                                          }
                                                          attempt
                                                      })
                                                      .collect()
                                         });

        for (index, (artifact, attempt)) in artifacts.iter().zip(attempts).enumerate() {
            if !matches!(attempt, Attempt::Skipped(_)) {
                let out_dir = artifact.output_dir(&self.settings.coverage_dir);
                self.record_started(run_id, index, artifact, &out_dir);
            }
            self.record_attempt(run_id, index, artifact, attempt);
        }
        Ok(halted.into_inner())
    }

    fn record_started(&mut self, run_id: Uuid, index: usize, artifact: &Artifact, out_dir: &CoverageOutputDir) {
        info!("instrument:start artifact={} output_dir={}",
              artifact.base_name(),
              out_dir.path().display());
        self.event_store
            .append_kind(run_id,
                         RunEventKind::InstrumentationStarted { index,
                                                                artifact: artifact.base_name().to_string(),
                                                                output_dir: out_dir.path().display().to_string() });
    }

    /// Registra el resultado y devuelve `true` si cuenta como fallo.
    fn record_attempt(&mut self, run_id: Uuid, index: usize, artifact: &Artifact, attempt: Attempt) -> bool {
        let failed = attempt.failed();
        let name = artifact.base_name().to_string();
        let kind = match attempt {
            Attempt::Ran { outcome, duration } if outcome.success() => {
                info!("instrument:done artifact={name} ms={}", duration.as_millis());
                RunEventKind::InstrumentationFinished { index,
                                                        artifact: name,
                                                        duration_ms: duration.as_millis() as u64 }
            }
            Attempt::Ran { outcome, duration } => {
                warn!("instrument:failed artifact={name} {}", outcome.describe());
                RunEventKind::InstrumentationFailed { index,
                                                      artifact: name,
                                                      exit_code: outcome.exit_code(),
                                                      timed_out: outcome.timed_out(),
                                                      error: Some(outcome.describe()),
                                                      duration_ms: duration.as_millis() as u64 }
            }
            Attempt::Errored { error, duration } => {
                error!("instrument:error artifact={name} err={error}");
                RunEventKind::InstrumentationFailed { index,
                                                      artifact: name,
                                                      exit_code: None,
                                                      timed_out: false,
                                                      error: Some(error),
                                                      duration_ms: duration.as_millis() as u64 }
            }
            Attempt::Skipped(reason) => {
                warn!("instrument:skip artifact={name} reason={reason}");
                RunEventKind::ArtifactSkipped { index,
                                                artifact: name,
                                                reason }
            }
        };
        self.event_store.append_kind(run_id, kind);
        failed
    }

    /// Paso de upload. Sólo se reintentan fallos de ejecución; los errores de
    /// confianza terminan el upload de inmediato.
    fn upload_phase(&mut self, run_id: Uuid, discovered: usize, halted: bool, deadline: &Deadline) {
        let policy = self.settings.upload;
        if policy == UploadPolicy::Disabled {
            info!("upload:disabled run_id={run_id}");
            return;
        }
        let skip = if halted {
            Some(SkipReason::FailFast)
        } else if discovered == 0 && policy == UploadPolicy::SkipWhenEmpty {
            Some(SkipReason::NoArtifacts)
        } else if deadline.expired() {
            Some(SkipReason::RunDeadline)
        } else {
            None
        };
        if let Some(reason) = skip {
            warn!("upload:skip run_id={run_id} reason={reason}");
            self.event_store
                .append_kind(run_id, RunEventKind::UploadSkipped { reason });
            return;
        }
        let Some(uploader) = self.uploader.as_deref() else {
            return;
        };

        let retry = self.settings.retry;
        let root = self.settings.coverage_dir.as_path();
        let mut attempt = 1;
        loop {
            info!("upload:start run_id={run_id} attempt={attempt}");
            self.event_store
                .append_kind(run_id, RunEventKind::UploadStarted { attempt });
            if let Err(trust) = uploader.verify() {
                error!("upload:rejected run_id={run_id} err={trust}");
                self.event_store.append_kind(run_id,
                                             RunEventKind::UploadFailed { attempts: attempt,
                                                                          error: trust.to_string() });
                return;
            }
            let error = match run_upload(uploader, root, deadline.clamp(self.settings.artifact_timeout)) {
                Ok(()) => {
                    info!("upload:done run_id={run_id} attempts={attempt}");
                    self.event_store
                        .append_kind(run_id, RunEventKind::UploadFinished { attempts: attempt });
                    return;
                }
                Err(e) => e,
            };
            if retry.allows_another(attempt) && !deadline.expired() {
                let delay = retry.delay_after(attempt);
                warn!("upload:retry run_id={run_id} attempt={attempt} err={error} -> sleeping {}ms",
                      delay.as_millis());
                self.event_store
                    .append_kind(run_id, RunEventKind::UploadAttemptFailed { attempt, error });
                std::thread::sleep(delay);
                attempt += 1;
            } else {
                error!("upload:failed run_id={run_id} attempts={attempt} err={error}");
                self.event_store.append_kind(run_id,
                                             RunEventKind::UploadFailed { attempts: attempt,
                                                                          error });
                return;
            }
        }
    }
}

fn run_upload(uploader: &dyn Uploader, root: &Path, timeout: Option<Duration>) -> Result<(), String> {
    match uploader.upload(root, timeout) {
        Ok(outcome) if outcome.success() => Ok(()),
        Ok(outcome) => Err(outcome.describe()),
        Err(e) => Err(e.to_string()),
    }
}

fn skip_reason(deadline: &Deadline, halted: &AtomicBool) -> Option<SkipReason> {
    if halted.load(Ordering::SeqCst) {
        Some(SkipReason::FailFast)
    } else if deadline.expired() {
        Some(SkipReason::RunDeadline)
    } else {
        None
    }
}

fn attempt_artifact(instrumenter: &dyn Instrumenter,
                    artifact: &Artifact,
                    out_dir: &CoverageOutputDir,
                    timeout: Option<Duration>)
                    -> Attempt {
    let started = Instant::now();
    if let Err(e) = refresh_output_dir(out_dir.path()) {
        return Attempt::Errored { error: format!("cannot prepare {}: {e}", out_dir.path().display()),
                                  duration: started.elapsed() };
    }
    debug!("instrument:exec {}", instrumenter.command_line(artifact, out_dir).join(" "));
    match instrumenter.instrument(artifact, out_dir, timeout) {
        Ok(outcome) => Attempt::Ran { outcome,
                                      duration: started.elapsed() },
        Err(e) => Attempt::Errored { error: e.to_string(),
                                     duration: started.elapsed() },
    }
}

/// Vacía y recrea el directorio de salida: repetir la corrida refresca los
/// datos en lugar de acumularlos.
fn refresh_output_dir(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(path)
}

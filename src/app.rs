//! Ejecución de `covflow`: arma el runner con los adaptadores concretos
//! (kcov, uploader fijado, log de eventos en disco) y traduce el resultado a
//! un código de salida.

use std::io::{self, Write};

use cov_adapters::{KcovInstrumenter, PinnedUploader};
use cov_core::engine::RunPlan;
use cov_core::{CoreError, CoverageRunner, EventStore, InMemoryEventStore, RunReport, UploadOutcome, Uploader};
use cov_persistence::{write_report, FileEventStore};
use log::{debug, error, info};

use crate::cli::Cli;
use crate::config::RunnerConfig;
use crate::errors::AppError;

/// Punto de entrada del binario: entorno + flags, y luego `execute`.
pub fn run(cli: &Cli) -> Result<u8, AppError> {
    let mut config = RunnerConfig::from_env()?;
    config.apply_cli(cli);
    execute(&config, cli.dry_run, &mut io::stdout().lock())
}

/// Ejecuta (o planifica, con `dry_run`) una corrida con `config`.
///
/// `Err` para errores fatales previos a la instrumentación. En otro caso
/// devuelve el código de salida del reporte; el resumen se escribe en `out`.
pub fn execute(config: &RunnerConfig, dry_run: bool, out: &mut dyn Write) -> Result<u8, AppError> {
    let settings = config.run_settings()?;
    if let Ok(json) = serde_json::to_string(config) {
        debug!("config:effective {json}");
    }
    let instrumenter = KcovInstrumenter::new(&config.instrumenter).exclude_patterns(config.exclude_patterns.clone())
                                                                  .verify(config.verify)
                                                                  .extra_args(config.instrumenter_args.clone());
    let uploader = build_uploader(config)?;

    if dry_run {
        let runner = build_runner(settings, InMemoryEventStore::default(), instrumenter, uploader)?;
        let plan = runner.plan()?;
        print_plan(out, &plan)?;
        return Ok(0);
    }

    // Antes de instrumentar: un uploader ausente o alterado no debe
    // descubrirse al final de una corrida larga.
    if let Some(uploader) = &uploader {
        uploader.verify()?;
    }

    let event_log = config.event_log_path();
    let store = FileEventStore::create(&event_log)?;
    let mut runner = build_runner(settings, store, instrumenter, uploader)?;
    let report = runner.run()?;
    info!("run:events path={}", event_log.display());

    let report_path = config.report_path();
    match write_report(&report_path, &report) {
        Ok(()) => info!("run:report path={}", report_path.display()),
        Err(e) => error!("run:report write failed path={} err={e}", report_path.display()),
    }
    print_summary(out, &report)?;
    Ok(report.exit_code())
}

fn build_uploader(config: &RunnerConfig) -> Result<Option<PinnedUploader>, AppError> {
    if !config.upload_enabled() {
        return Ok(None);
    }
    let Some(location) = config.uploader.as_deref() else {
        return Ok(None);
    };
    let uploader = PinnedUploader::new(location)?.expected_sha256(config.uploader_sha256.clone())
                                                 .dir_flag(config.upload_dir_flag.clone())
                                                 .extra_args(config.upload_args.clone())
                                                 .token_env(config.token_env.clone());
    Ok(Some(uploader))
}

fn build_runner<E: EventStore>(settings: cov_core::RunSettings,
                               store: E,
                               instrumenter: KcovInstrumenter,
                               uploader: Option<PinnedUploader>)
                               -> Result<CoverageRunner<E>, CoreError> {
    let builder = CoverageRunner::builder(settings, store).instrumenter(instrumenter);
    match uploader {
        Some(uploader) => builder.uploader(uploader).build(),
        None => builder.build(),
    }
}

fn print_plan(out: &mut dyn Write, plan: &RunPlan) -> Result<(), AppError> {
    writeln!(out, "{} artifact(s) planificados", plan.artifacts.len()).map_err(CoreError::from)?;
    for planned in &plan.artifacts {
        writeln!(out, "  {}", planned.command.join(" ")).map_err(CoreError::from)?;
    }
    let upload = match &plan.upload {
        Some(command) => command.join(" "),
        None => "omitido".to_string(),
    };
    writeln!(out, "upload: {upload}").map_err(CoreError::from)?;
    Ok(())
}

fn print_summary(out: &mut dyn Write, report: &RunReport) -> Result<(), AppError> {
    let failures = report.failures();
    writeln!(out,
             "{} artifact(s): {} ok, {} con fallo",
             report.artifacts.len(),
             report.succeeded_count(),
             failures.len()).map_err(CoreError::from)?;
    for outcome in failures {
        let detail = outcome.error
                            .clone()
                            .or_else(|| outcome.skip_reason.as_ref().map(|r| r.to_string()))
                            .unwrap_or_else(|| format!("{:?}", outcome.status));
        writeln!(out, "  FAIL {}: {}", outcome.name, detail).map_err(CoreError::from)?;
    }
    let upload = match &report.upload {
        UploadOutcome::NotRequested => "no solicitado".to_string(),
        UploadOutcome::Skipped { reason } => format!("omitido ({reason})"),
        UploadOutcome::InProgress { attempts } => format!("interrumpido tras {attempts} intento(s)"),
        UploadOutcome::Succeeded { attempts } => format!("ok ({attempts} intento(s))"),
        UploadOutcome::Failed { attempts, error } => format!("falló tras {attempts} intento(s): {error}"),
    };
    writeln!(out, "upload: {upload}").map_err(CoreError::from)?;
    writeln!(out, "exit code: {}", report.exit_code()).map_err(CoreError::from)?;
    Ok(())
}

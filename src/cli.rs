//! Argumentos de línea de comando de `covflow`.
//!
//! Todos los valores son opcionales aquí: los que faltan se completan desde
//! el entorno o los valores por defecto de `RunnerConfig`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "covflow",
          version,
          about = "Instrumenta los binarios de test de un build y sube la cobertura agregada")]
pub struct Cli {
    /// Directorio con los binarios compilados [env: COVFLOW_BUILD_DIR] [default: target/debug]
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Prefijo de nombre de los artifacts a instrumentar [env: COVFLOW_PREFIX]
    #[arg(long)]
    pub prefix: Option<String>,

    /// Raíz de los reportes de cobertura [env: COVFLOW_COVERAGE_DIR] [default: target/cov]
    #[arg(long, value_name = "DIR")]
    pub coverage_dir: Option<PathBuf>,

    /// Patrón de exclusión del instrumentador; se puede repetir o separar por comas
    #[arg(long = "exclude-pattern", value_name = "PATTERN", value_delimiter = ',')]
    pub exclude_patterns: Vec<String>,

    /// Programa instrumentador [env: COVFLOW_INSTRUMENTER] [default: kcov]
    #[arg(long, value_name = "PROGRAM")]
    pub instrumenter: Option<String>,

    /// Argumento extra para el instrumentador (antes del directorio de salida)
    #[arg(long = "instrumenter-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub instrumenter_args: Vec<String>,

    /// No pasar `--verify` al instrumentador
    #[arg(long)]
    pub no_verify: bool,

    /// Ruta local (o nombre en PATH) del uploader [env: COVFLOW_UPLOADER]
    #[arg(long, value_name = "PATH")]
    pub uploader: Option<String>,

    /// SHA-256 esperado del uploader [env: COVFLOW_UPLOADER_SHA256]
    #[arg(long = "upload-sha256", value_name = "HEX")]
    pub upload_sha256: Option<String>,

    /// Flag con el que el uploader recibe el directorio de cobertura [default: -s]
    #[arg(long, value_name = "FLAG", allow_hyphen_values = true)]
    pub upload_dir_flag: Option<String>,

    /// Argumento extra para el uploader
    #[arg(long = "upload-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub upload_args: Vec<String>,

    /// Variable de entorno con el token del servicio [default: CODECOV_TOKEN]
    #[arg(long, value_name = "VAR")]
    pub token_env: Option<String>,

    /// No ejecutar el paso de upload
    #[arg(long)]
    pub no_upload: bool,

    /// Omitir el upload cuando no se encontró ningún artifact
    #[arg(long, conflicts_with = "no_upload")]
    pub skip_empty_upload: bool,

    /// Reintentos del upload tras el primer intento [default: 0]
    #[arg(long, value_name = "N")]
    pub upload_retries: Option<u32>,

    /// Backoff lineal entre intentos de upload, en milisegundos [default: 500]
    #[arg(long, value_name = "MS")]
    pub retry_backoff_ms: Option<u64>,

    /// Instrumentaciones concurrentes [env: COVFLOW_JOBS] [default: 1]
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Timeout por artifact (y por intento de upload), en segundos
    #[arg(long, value_name = "SECS")]
    pub artifact_timeout: Option<u64>,

    /// Límite total de la corrida, en segundos
    #[arg(long, value_name = "SECS")]
    pub run_timeout: Option<u64>,

    /// Detenerse tras el primer artifact fallido (omite el resto y el upload)
    #[arg(long)]
    pub fail_fast: bool,

    /// Ruta del reporte JSON [default: <coverage-dir>/../covflow/covflow-report.json]
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Ruta del log de eventos [default: <coverage-dir>/../covflow/covflow-events.jsonl]
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Sólo descubrir artifacts e imprimir los comandos planificados
    #[arg(long)]
    pub dry_run: bool,

    /// Más detalle en los logs (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Menos detalle en los logs (-q warn, -qq error)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Cli {
    /// Nivel de log a partir de `-v`/`-q`; `info` por defecto.
    pub fn log_level(&self) -> LevelFilter {
        match (self.verbose, self.quiet) {
            (0, 0) => LevelFilter::Info,
            (1, _) => LevelFilter::Debug,
            (v, _) if v >= 2 => LevelFilter::Trace,
            (_, 1) => LevelFilter::Warn,
            (_, 2) => LevelFilter::Error,
            _ => LevelFilter::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_follows_flags() {
        let mut cli = Cli::default();
        assert_eq!(cli.log_level(), LevelFilter::Info);
        cli.verbose = 1;
        assert_eq!(cli.log_level(), LevelFilter::Debug);
        cli.verbose = 3;
        assert_eq!(cli.log_level(), LevelFilter::Trace);
        cli.verbose = 0;
        cli.quiet = 2;
        assert_eq!(cli.log_level(), LevelFilter::Error);
        cli.quiet = 5;
        assert_eq!(cli.log_level(), LevelFilter::Off);
    }
}

//! Configuración de una ejecución de `covflow`.
//!
//! Se arma por capas:
//! 1. valores por defecto (`RunnerConfig::default`),
//! 2. variables de entorno `COVFLOW_*` (con `.env` cargado una sola vez),
//! 3. flags de línea de comando (`apply_cli`).
//!
//! `validate` se ejecuta antes de construir nada; `run_settings` traduce el
//! resultado a los `RunSettings` del core.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use cov_adapters::is_remote_location;
use cov_core::constants::{EVENT_LOG_FILE_NAME, REPORT_FILE_NAME};
use cov_core::{RetryPolicy, RunSettings, UploadPolicy};
use cov_domain::ArtifactFilter;
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::cli::Cli;
use crate::errors::ConfigError;

pub const ENV_BUILD_DIR: &str = "COVFLOW_BUILD_DIR";
pub const ENV_PREFIX: &str = "COVFLOW_PREFIX";
pub const ENV_COVERAGE_DIR: &str = "COVFLOW_COVERAGE_DIR";
pub const ENV_EXCLUDE_PATTERNS: &str = "COVFLOW_EXCLUDE_PATTERNS";
pub const ENV_INSTRUMENTER: &str = "COVFLOW_INSTRUMENTER";
pub const ENV_UPLOADER: &str = "COVFLOW_UPLOADER";
pub const ENV_UPLOADER_SHA256: &str = "COVFLOW_UPLOADER_SHA256";
pub const ENV_JOBS: &str = "COVFLOW_JOBS";

/// Directorio de reporte y log de eventos, hermano de la raíz de cobertura:
/// la raíz completa se entrega al uploader.
pub const STATE_DIR_NAME: &str = "covflow";

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env (por ejemplo antes de inicializar logs).
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunnerConfig {
    pub build_dir: PathBuf,
    pub prefix: Option<String>,
    pub coverage_dir: PathBuf,
    pub exclude_patterns: Vec<String>,
    pub instrumenter: String,
    pub instrumenter_args: Vec<String>,
    pub verify: bool,
    pub upload: UploadPolicy,
    pub uploader: Option<String>,
    pub uploader_sha256: Option<String>,
    pub upload_dir_flag: String,
    pub upload_args: Vec<String>,
    pub token_env: String,
    pub upload_retries: u32,
    pub retry_backoff_ms: u64,
    pub jobs: usize,
    pub artifact_timeout_secs: Option<u64>,
    pub run_timeout_secs: Option<u64>,
    pub fail_fast: bool,
    pub report_path: Option<PathBuf>,
    pub event_log_path: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { build_dir: PathBuf::from("target/debug"),
               prefix: None,
               coverage_dir: PathBuf::from("target/cov"),
               exclude_patterns: vec!["/.cargo".to_string(), "/usr/lib".to_string()],
               instrumenter: "kcov".to_string(),
               instrumenter_args: Vec::new(),
               verify: true,
               upload: UploadPolicy::Always,
               uploader: None,
               uploader_sha256: None,
               upload_dir_flag: "-s".to_string(),
               upload_args: Vec::new(),
               token_env: "CODECOV_TOKEN".to_string(),
               upload_retries: 0,
               retry_backoff_ms: 500,
               jobs: 1,
               artifact_timeout_secs: None,
               run_timeout_secs: None,
               fail_fast: false,
               report_path: None,
               event_log_path: None }
    }
}

impl RunnerConfig {
    /// Defaults + entorno del proceso (y `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults + variables obtenidas con `lookup`. Valores vacíos se ignoran.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();
        if let Some(dir) = get(ENV_BUILD_DIR) {
            cfg.build_dir = PathBuf::from(dir);
        }
        cfg.prefix = get(ENV_PREFIX);
        if let Some(dir) = get(ENV_COVERAGE_DIR) {
            cfg.coverage_dir = PathBuf::from(dir);
        }
        if let Some(patterns) = get(ENV_EXCLUDE_PATTERNS) {
            cfg.exclude_patterns = split_patterns(&patterns);
        }
        if let Some(program) = get(ENV_INSTRUMENTER) {
            cfg.instrumenter = program;
        }
        cfg.uploader = get(ENV_UPLOADER);
        cfg.uploader_sha256 = get(ENV_UPLOADER_SHA256);
        if let Some(jobs) = get(ENV_JOBS) {
            cfg.jobs = parse_env(ENV_JOBS, &jobs)?;
        }
        Ok(cfg)
    }

    /// Los flags presentes reemplazan a lo que vino del entorno.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.build_dir {
            self.build_dir = dir.clone();
        }
        if let Some(prefix) = &cli.prefix {
            self.prefix = Some(prefix.clone());
        }
        if let Some(dir) = &cli.coverage_dir {
            self.coverage_dir = dir.clone();
        }
        if !cli.exclude_patterns.is_empty() {
            self.exclude_patterns = cli.exclude_patterns.iter()
                                                        .map(|p| p.trim().to_string())
                                                        .filter(|p| !p.is_empty())
                                                        .collect();
        }
        if let Some(program) = &cli.instrumenter {
            self.instrumenter = program.clone();
        }
        if !cli.instrumenter_args.is_empty() {
            self.instrumenter_args = cli.instrumenter_args.clone();
        }
        if cli.no_verify {
            self.verify = false;
        }
        if cli.no_upload {
            self.upload = UploadPolicy::Disabled;
        } else if cli.skip_empty_upload {
            self.upload = UploadPolicy::SkipWhenEmpty;
        }
        if let Some(uploader) = &cli.uploader {
            self.uploader = Some(uploader.clone());
        }
        if let Some(sha) = &cli.upload_sha256 {
            self.uploader_sha256 = Some(sha.clone());
        }
        if let Some(flag) = &cli.upload_dir_flag {
            self.upload_dir_flag = flag.clone();
        }
        if !cli.upload_args.is_empty() {
            self.upload_args = cli.upload_args.clone();
        }
        if let Some(var) = &cli.token_env {
            self.token_env = var.clone();
        }
        if let Some(retries) = cli.upload_retries {
            self.upload_retries = retries;
        }
        if let Some(ms) = cli.retry_backoff_ms {
            self.retry_backoff_ms = ms;
        }
        if let Some(jobs) = cli.jobs {
            self.jobs = jobs;
        }
        if cli.artifact_timeout.is_some() {
            self.artifact_timeout_secs = cli.artifact_timeout;
        }
        if cli.run_timeout.is_some() {
            self.run_timeout_secs = cli.run_timeout;
        }
        if cli.fail_fast {
            self.fail_fast = true;
        }
        if let Some(path) = &cli.report {
            self.report_path = Some(path.clone());
        }
        if let Some(path) = &cli.event_log {
            self.event_log_path = Some(path.clone());
        }
    }

    pub fn upload_enabled(&self) -> bool {
        self.upload != UploadPolicy::Disabled
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.prefix.as_deref().ok_or(ConfigError::MissingPrefix)?;
        ArtifactFilter::new(prefix)?;
        if self.jobs == 0 {
            return Err(ConfigError::Invalid("jobs debe ser al menos 1".into()));
        }
        if self.instrumenter.trim().is_empty() {
            return Err(ConfigError::Invalid("instrumentador vacío".into()));
        }
        if self.artifact_timeout_secs == Some(0) || self.run_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("los timeouts deben ser mayores que 0".into()));
        }
        if let Some(location) = &self.uploader {
            if is_remote_location(location) {
                return Err(cov_core::TrustError::RemoteUploader(location.clone()).into());
            }
        }
        if self.upload_enabled() && self.uploader.is_none() {
            return Err(ConfigError::Invalid(format!("upload habilitado sin uploader (--uploader o {ENV_UPLOADER}); \
                                                     usar --no-upload para omitirlo")));
        }
        if let Some(sha) = &self.uploader_sha256 {
            let sha = sha.trim();
            if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::Invalid(format!("sha256 del uploader inválido: {sha}")));
            }
        }
        Ok(())
    }

    /// `target/cov` → `target/covflow`.
    pub fn state_dir(&self) -> PathBuf {
        self.coverage_dir
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(STATE_DIR_NAME)
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_path.clone()
            .unwrap_or_else(|| self.state_dir().join(REPORT_FILE_NAME))
    }

    pub fn event_log_path(&self) -> PathBuf {
        self.event_log_path.clone()
            .unwrap_or_else(|| self.state_dir().join(EVENT_LOG_FILE_NAME))
    }

    /// Valida y traduce a los parámetros del runner.
    pub fn run_settings(&self) -> Result<RunSettings, ConfigError> {
        self.validate()?;
        let prefix = self.prefix.as_deref().ok_or(ConfigError::MissingPrefix)?;
        let filter = ArtifactFilter::new(prefix)?;
        let mut settings = RunSettings::new(&self.build_dir, &self.coverage_dir, filter);
        settings.upload = self.upload;
        settings.fail_fast = self.fail_fast;
        settings.jobs = self.jobs;
        settings.artifact_timeout = self.artifact_timeout_secs.map(Duration::from_secs);
        settings.run_timeout = self.run_timeout_secs.map(Duration::from_secs);
        settings.retry = RetryPolicy::new(self.upload_retries, Duration::from_millis(self.retry_backoff_ms));
        Ok(settings)
    }
}

fn split_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
       .map(|p| p.trim().to_string())
       .filter(|p| !p.is_empty())
       .collect()
}

fn parse_env<T>(var: &str, value: &str) -> Result<T, ConfigError>
    where T: FromStr,
          T::Err: std::fmt::Display
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidEnv { var: var.to_string(),
                                                                value: value.to_string(),
                                                                reason: e.to_string() })
}

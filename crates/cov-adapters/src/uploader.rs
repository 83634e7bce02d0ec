//! Uploader local fijado.
//!
//! Reemplaza el patrón "descargar script y ejecutarlo" por un programa local:
//! - Ubicaciones con esquema (`https://...`) se rechazan al construir.
//! - Con `expected_sha256`, el archivo se verifica antes de cada ejecución;
//!   si no coincide no se ejecuta.
//! - El token se lee de la variable configurada y sólo se pasa al hijo.
//!
//! Línea de comando: `<uploader> <extra...> <dir_flag> <coverage_root>`.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cov_core::hashing::{checksums_match, sha256_file};
use cov_core::{CoreError, ExecOutcome, TrustError, Uploader};
use log::{debug, warn};

use crate::process::{run_with_timeout, CommandSpec};

/// `true` si parece una URL (`esquema://`). Nunca se ejecuta algo así.
pub fn is_remote_location(location: &str) -> bool {
    location.contains("://")
}

#[derive(Debug, Clone)]
pub struct PinnedUploader {
    program: PathBuf,
    expected_sha256: Option<String>,
    dir_flag: String,
    extra_args: Vec<String>,
    token_env: String,
}

impl PinnedUploader {
    /// `location` es una ruta local o un nombre a resolver en PATH.
    pub fn new(location: &str) -> Result<Self, TrustError> {
        if is_remote_location(location) {
            return Err(TrustError::RemoteUploader(location.to_string()));
        }
        let program = resolve_program(location)?;
        Ok(Self { program,
                  expected_sha256: None,
                  dir_flag: "-s".to_string(),
                  extra_args: Vec::new(),
                  token_env: "CODECOV_TOKEN".to_string() })
    }

    pub fn expected_sha256(mut self, sha256: Option<String>) -> Self {
        self.expected_sha256 = sha256;
        self
    }

    pub fn dir_flag(mut self, flag: impl Into<String>) -> Self {
        self.dir_flag = flag.into();
        self
    }

    pub fn extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn token_env(mut self, name: impl Into<String>) -> Self {
        self.token_env = name.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn command_for(&self, coverage_root: &Path) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program).args(&self.extra_args);
        if !self.dir_flag.is_empty() {
            spec = spec.arg(&self.dir_flag);
        }
        spec = spec.arg(OsString::from(coverage_root));
        match env::var_os(&self.token_env) {
            Some(token) => spec.env(&self.token_env, token),
            None => {
                warn!("upload:token missing env={}", self.token_env);
                spec
            }
        }
    }
}

/// Nombres sin separador se buscan en PATH; rutas se usan tal cual.
fn resolve_program(location: &str) -> Result<PathBuf, TrustError> {
    let path = Path::new(location);
    if path.components().count() > 1 || path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    which::which(location).map_err(|e| TrustError::MissingUploader(format!("{location}: {e}")))
}

impl Uploader for PinnedUploader {
    fn verify(&self) -> Result<(), TrustError> {
        let shown = self.program.display().to_string();
        match fs::metadata(&self.program) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(TrustError::MissingUploader(shown)),
            Err(e) => return Err(TrustError::MissingUploader(format!("{shown}: {e}"))),
        }
        let Some(expected) = &self.expected_sha256 else {
            warn!("upload:unverified program={shown} (no sha256 pinned)");
            return Ok(());
        };
        let actual = sha256_file(&self.program).map_err(|e| TrustError::MissingUploader(format!("{shown}: {e}")))?;
        if !checksums_match(expected, &actual) {
            return Err(TrustError::ChecksumMismatch { path: shown,
                                                      expected: expected.trim().to_ascii_lowercase(),
                                                      actual });
        }
        debug!("upload:verified program={shown} sha256={actual}");
        Ok(())
    }

    fn command_line(&self, coverage_root: &Path) -> Vec<String> {
        self.command_for(coverage_root).display_parts()
    }

    fn upload(&self, coverage_root: &Path, timeout: Option<Duration>) -> Result<ExecOutcome, CoreError> {
        Ok(run_with_timeout(&self.command_for(coverage_root), timeout)?)
    }
}

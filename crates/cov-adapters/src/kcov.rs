//! Instrumentador kcov.
//!
//! Línea de comando:
//! `kcov [--exclude-pattern=p1,p2] [--verify] <extra...> <outdir> <artifact> <artifact args...>`

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use cov_core::{CoreError, ExecOutcome, Instrumenter};
use cov_domain::{Artifact, CoverageOutputDir};

use crate::process::{run_with_timeout, CommandSpec};

#[derive(Debug, Clone)]
pub struct KcovInstrumenter {
    program: PathBuf,
    exclude_patterns: Vec<String>,
    verify: bool,
    extra_args: Vec<String>,
    artifact_args: Vec<String>,
}

impl KcovInstrumenter {
    /// `program` puede ser un nombre (se resuelve vía PATH al lanzar) o una
    /// ruta. Verificación estricta activa por defecto.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(),
               exclude_patterns: Vec::new(),
               verify: true,
               extra_args: Vec::new(),
               artifact_args: Vec::new() }
    }

    pub fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Opciones adicionales para kcov (antes del directorio de salida).
    pub fn extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Argumentos para el binario medido (después de su ruta).
    pub fn artifact_args(mut self, args: Vec<String>) -> Self {
        self.artifact_args = args;
        self
    }

    pub fn command_for(&self, artifact: &Artifact, out_dir: &CoverageOutputDir) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program);
        let patterns: Vec<&str> = self.exclude_patterns
                                      .iter()
                                      .map(|p| p.trim())
                                      .filter(|p| !p.is_empty())
                                      .collect();
        if !patterns.is_empty() {
            spec = spec.arg(format!("--exclude-pattern={}", patterns.join(",")));
        }
        if self.verify {
            spec = spec.arg("--verify");
        }
        spec.args(&self.extra_args)
            .arg(OsString::from(out_dir.path()))
            .arg(OsString::from(artifact.path()))
            .args(&self.artifact_args)
    }
}

impl Instrumenter for KcovInstrumenter {
    fn name(&self) -> &str {
        "kcov"
    }

    fn command_line(&self, artifact: &Artifact, out_dir: &CoverageOutputDir) -> Vec<String> {
        self.command_for(artifact, out_dir).display_parts()
    }

    fn instrument(&self,
                  artifact: &Artifact,
                  out_dir: &CoverageOutputDir,
                  timeout: Option<Duration>)
                  -> Result<ExecOutcome, CoreError> {
        Ok(run_with_timeout(&self.command_for(artifact, out_dir), timeout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn builds_kcov_command_line() {
        let artifact = Artifact::new("target/debug/app-abc123", true).unwrap();
        let out = artifact.output_dir(Path::new("target/cov"));
        let kcov = KcovInstrumenter::new("kcov").exclude_patterns(vec!["/.cargo".into(), " /usr/lib ".into(), "".into()]);
        assert_eq!(kcov.command_line(&artifact, &out),
                   vec!["kcov",
                        "--exclude-pattern=/.cargo,/usr/lib",
                        "--verify",
                        "target/cov/app-abc123",
                        "target/debug/app-abc123"]);
    }

    #[test]
    fn optional_flags_are_omitted() {
        let artifact = Artifact::new("bin/app-x", true).unwrap();
        let out = artifact.output_dir(Path::new("cov"));
        let kcov = KcovInstrumenter::new("/opt/kcov/bin/kcov").verify(false)
                                                             .extra_args(vec!["--include-path=src".into()])
                                                             .artifact_args(vec!["--test-threads=1".into()]);
        assert_eq!(kcov.command_line(&artifact, &out),
                   vec!["/opt/kcov/bin/kcov",
                        "--include-path=src",
                        "cov/app-x",
                        "bin/app-x",
                        "--test-threads=1"]);
    }
}

//! Lanzamiento de procesos externos con timeout opcional.
//!
//! Sin timeout se espera con `wait`. Con timeout se sondea con `try_wait` y,
//! al vencer, se mata el hijo y se recolecta su estado para no dejar zombies.
//! stdout/stderr se heredan: la salida de los tests instrumentados queda
//! visible en la consola de la corrida.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use cov_core::constants::PROCESS_POLL_INTERVAL_MS;
use cov_core::ExecOutcome;
use log::{debug, warn};

use crate::error::AdapterError;

/// Descripción de un comando a ejecutar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Variables extra para el hijo. No se muestran en `display_parts` porque
    /// pueden contener secretos (token de upload).
    pub envs: Vec<(OsString, OsString)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(),
               args: Vec::new(),
               envs: Vec::new() }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<OsString>
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Programa + argumentos como texto (lossy), para logs y `--dry-run`.
    pub fn display_parts(&self) -> Vec<String> {
        std::iter::once(self.program.display().to_string()).chain(self.args
                                                                      .iter()
                                                                      .map(|a| a.to_string_lossy().into_owned()))
                                                          .collect()
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (k, v) in &self.envs {
            cmd.env(k, v);
        }
        cmd
    }
}

pub fn run_with_timeout(spec: &CommandSpec, timeout: Option<Duration>) -> Result<ExecOutcome, AdapterError> {
    let program = spec.program.display().to_string();
    let mut child = spec.to_command()
                        .spawn()
                        .map_err(|source| AdapterError::Spawn { program: program.clone(),
                                                                source })?;
    let pid = child.id();
    debug!("process:spawned program={program} pid={pid}");

    let Some(timeout) = timeout else {
        let status = child.wait()
                          .map_err(|source| AdapterError::Wait { program: program.clone(),
                                                                 source })?;
        return Ok(ExecOutcome::Exited { code: status.code() });
    };

    let start = Instant::now();
    let poll = Duration::from_millis(PROCESS_POLL_INTERVAL_MS);
    loop {
        if let Some(status) = child.try_wait()
                                   .map_err(|source| AdapterError::Wait { program: program.clone(),
                                                                          source })?
        {
            return Ok(ExecOutcome::Exited { code: status.code() });
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            warn!("process:timeout program={program} pid={pid} after={}ms", timeout.as_millis());
            let _ = child.kill();
            let _ = child.wait();
            return Ok(ExecOutcome::TimedOut { after: timeout });
        }
        thread::sleep(poll.min(timeout - elapsed));
    }
}

//! `FileEventStore`: log de eventos en JSON lines.
//!
//! Mantiene una copia en memoria (autoritativa para `list`) y replica cada
//! evento al archivo. Un fallo de escritura se registra con `error!` y no
//! interrumpe la corrida: perder el log no debe invalidar la cobertura ya
//! generada.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use cov_core::{EventStore, RunEvent, RunEventKind};
use log::{debug, error};
use uuid::Uuid;

use crate::error::PersistenceError;

#[derive(Debug)]
pub struct FileEventStore {
    path: PathBuf,
    events: Vec<RunEvent>,
}

impl FileEventStore {
    /// Crea (o trunca) el archivo de log, creando directorios padre.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }
        File::create(&path).map_err(|e| PersistenceError::io(&path, e))?;
        debug!("event_log:create path={}", path.display());
        Ok(Self { path, events: Vec::new() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, event: &RunEvent) -> Result<(), PersistenceError> {
        let line = serde_json::to_string(event).map_err(|e| PersistenceError::serialization(&self.path, e))?;
        let mut file = OpenOptions::new().append(true)
                                         .open(&self.path)
                                         .map_err(|e| PersistenceError::io(&self.path, e))?;
        writeln!(file, "{line}").map_err(|e| PersistenceError::io(&self.path, e))
    }
}

impl EventStore for FileEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        let seq = self.events.iter().filter(|e| e.run_id == run_id).count() as u64;
        let ev = RunEvent { seq, run_id, kind, ts: Utc::now() };
        if let Err(e) = self.write_line(&ev) {
            error!("event_log:append error run_id={run_id} seq={seq} err={e}");
        }
        self.events.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.events
            .iter()
            .filter(|e| e.run_id == run_id)
            .cloned()
            .collect()
    }
}

/// Lee un log JSON lines completo (todas las corridas, en orden de archivo).
/// Las líneas vacías se ignoran.
pub fn load_events(path: &Path) -> Result<Vec<RunEvent>, PersistenceError> {
    let file = File::open(path).map_err(|e| PersistenceError::io(path, e))?;
    let mut events = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| PersistenceError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(serde_json::from_str(&line).map_err(|e| PersistenceError::serialization(path, e))?);
    }
    Ok(events)
}

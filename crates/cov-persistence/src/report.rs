//! Reporte de corrida en JSON (pretty).

use std::fs;
use std::path::Path;

use cov_core::RunReport;
use log::debug;

use crate::error::PersistenceError;

pub fn write_report(path: &Path, report: &RunReport) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(report).map_err(|e| PersistenceError::serialization(path, e))?;
    fs::write(path, json).map_err(|e| PersistenceError::io(path, e))?;
    debug!("report:written path={} run_id={}", path.display(), report.run_id);
    Ok(())
}

pub fn read_report(path: &Path) -> Result<RunReport, PersistenceError> {
    let raw = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| PersistenceError::serialization(path, e))
}

//! Motor de la corrida de cobertura.
//!
//! - `settings`: parámetros de una corrida (rutas, filtro, políticas).
//! - `builder`: construcción validada de `CoverageRunner`.
//! - `runner`: ejecución discover → instrument → upload con eventos.
//! - `deadline`: deadline global y recorte de timeouts por comando.

mod builder;
mod runner;
mod deadline;
mod settings;

pub use builder::CoverageRunnerBuilder;
pub use runner::{CoverageRunner, PlannedArtifact, RunPlan};
pub use deadline::Deadline;
pub use settings::{RunSettings, UploadPolicy};

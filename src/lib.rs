//! covflow
//!
//! Binario que recorre un directorio de build, instrumenta cada binario de
//! test con kcov y sube la cobertura agregada con un uploader local fijado.
//! - `cli`: flags (clap).
//! - `config`: configuración por capas (defaults, entorno, flags).
//! - `app`: arma el runner y traduce el reporte a un código de salida.
//! - `errors`: errores de configuración y errores fatales.

pub mod app;
pub mod cli;
pub mod config;
pub mod errors;

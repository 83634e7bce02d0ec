//! Errores del binario `covflow`.
//!
//! - `ConfigError`: configuración inválida (entorno o flags).
//! - `AppError`: cualquier error fatal de una ejecución; todos terminan con
//!   el código de salida `EXIT_FATAL`.

pub mod app_error;
pub mod config_error;

pub use app_error::AppError;
pub use config_error::ConfigError;

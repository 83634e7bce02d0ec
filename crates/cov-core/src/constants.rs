//! Constantes compartidas por el motor y los adaptadores.

/// Nombre por defecto del reporte JSON dentro del directorio de cobertura.
pub const REPORT_FILE_NAME: &str = "covflow-report.json";

/// Nombre por defecto del log de eventos (JSON lines) dentro del directorio de
/// cobertura.
pub const EVENT_LOG_FILE_NAME: &str = "covflow-events.jsonl";

/// Intervalo de sondeo de procesos hijos cuando hay timeout.
pub const PROCESS_POLL_INTERVAL_MS: u64 = 50;

/// Código de salida: algún artifact falló, expiró o quedó sin procesar.
pub const EXIT_INSTRUMENTATION_FAILED: u8 = 1;

/// Código de salida: error fatal antes de instrumentar (config, confianza,
/// discovery).
pub const EXIT_FATAL: u8 = 3;

/// Código de salida: el paso de upload falló. Se combina con
/// `EXIT_INSTRUMENTATION_FAILED` como bit (1 | 4 = 5).
pub const EXIT_UPLOAD_FAILED: u8 = 4;

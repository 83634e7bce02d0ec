//! cov-persistence
//!
//! Persistencia en disco de una corrida:
//! - `event_log`: `FileEventStore`, implementación JSON-lines del
//!   `EventStore` del core (un `RunEvent` por línea, append-only).
//! - `report`: lectura/escritura del `RunReport` como JSON.
//! - `error`: errores de E/S y serialización.

pub mod error;
pub mod event_log;
pub mod report;

pub use error::PersistenceError;
pub use event_log::{load_events, FileEventStore};
pub use report::{read_report, write_report};

//! cov-adapters: implementaciones de `Instrumenter` y `Uploader` basadas en
//! procesos del sistema.
//!
//! - `process`: lanzamiento con timeout (sondeo + kill).
//! - `kcov`: instrumentador kcov.
//! - `uploader`: uploader local fijado, verificado por checksum antes de
//!   cada ejecución. Nunca descarga ni ejecuta código remoto.

pub mod error;
pub mod kcov;
pub mod process;
pub mod uploader;

pub use error::AdapterError;
pub use kcov::KcovInstrumenter;
pub use process::{run_with_timeout, CommandSpec};
pub use uploader::{is_remote_location, PinnedUploader};

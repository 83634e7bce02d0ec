//! Fronteras con herramientas externas.
//!
//! El core no sabe cómo se lanza un proceso: sólo conoce estos traits. Las
//! implementaciones basadas en `std::process` viven en `cov-adapters`; los
//! tests del engine usan dobles en memoria.

mod instrumenter;
mod outcome;
mod uploader;

pub use instrumenter::Instrumenter;
pub use outcome::ExecOutcome;
pub use uploader::Uploader;

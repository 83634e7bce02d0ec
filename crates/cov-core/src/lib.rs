//! cov-core: orquestación lineal de una corrida de cobertura
//! (discover → instrument → upload) con log de eventos append-only.
pub mod constants;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod event;
pub mod external;
pub mod hashing;
pub mod report;
pub mod retry;

pub use discovery::discover_artifacts;
pub use engine::{CoverageRunner, RunSettings, UploadPolicy};
pub use errors::{CoreError, TrustError};
pub use event::{ArtifactRef, EventStore, InMemoryEventStore, RunEvent, RunEventKind, SkipReason};
pub use external::{ExecOutcome, Instrumenter, Uploader};
pub use report::{ArtifactOutcome, ArtifactStatus, RunReport, UploadOutcome};
pub use retry::RetryPolicy;

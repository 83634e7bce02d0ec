//! Definiciones de eventos de corrida y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{ArtifactRef, RunEvent, RunEventKind, SkipReason};

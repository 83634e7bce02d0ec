use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};

/// Destino append-only de los eventos de una corrida.
///
/// `seq` lo asigna el store, empezando en 0 por corrida; `list` devuelve los
/// eventos en ese mismo orden.
pub trait EventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent;
    fn list(&self, run_id: Uuid) -> Vec<RunEvent>;
}

/// Store en memoria, usado en `--dry-run` y en tests.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    runs: HashMap<Uuid, Vec<RunEvent>>,
}

impl InMemoryEventStore {
    /// Eventos de `run_id` sin copiarlos.
    pub fn events(&self, run_id: Uuid) -> &[RunEvent] {
        self.runs.get(&run_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn run_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.runs.keys().copied()
    }
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        let log = self.runs.entry(run_id).or_default();
        let event = RunEvent { seq: log.len() as u64,
                               run_id,
                               kind,
                               ts: Utc::now() };
        log.push(event.clone());
        event
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.events(run_id).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SkipReason;

    #[test]
    fn runs_are_kept_apart_with_their_own_seq() {
        let mut store = InMemoryEventStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.append_kind(a, RunEventKind::UploadStarted { attempt: 1 });
        store.append_kind(b, RunEventKind::UploadSkipped { reason: SkipReason::NoArtifacts });
        let last = store.append_kind(a, RunEventKind::UploadFinished { attempts: 1 });

        assert_eq!(last.seq, 1);
        assert_eq!(store.events(a).len(), 2);
        assert_eq!(store.list(b)[0].seq, 0);
        assert!(store.events(Uuid::new_v4()).is_empty());
        assert_eq!(store.run_ids().count(), 2);
    }
}

use std::time::{Duration, Instant};

/// Deadline global de la corrida. Sin límite cuando es `None`.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// Un límite que no se puede representar como `Instant` equivale a no
    /// tener límite.
    pub fn after(limit: Option<Duration>) -> Self {
        Self(limit.and_then(|d| Instant::now().checked_add(d)))
    }

    pub fn unlimited() -> Self {
        Self(None)
    }

    pub fn expired(&self) -> bool {
        self.0.map(|at| Instant::now() >= at).unwrap_or(false)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.0.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Recorta un timeout por comando al tiempo restante de la corrida.
    pub fn clamp(&self, timeout: Option<Duration>) -> Option<Duration> {
        match (timeout, self.remaining()) {
            (Some(t), Some(r)) => Some(t.min(r)),
            (Some(t), None) => Some(t),
            (None, r) => r,
        }
    }
}

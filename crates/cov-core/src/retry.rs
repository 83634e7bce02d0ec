//! Política de reintentos acotados (sólo se aplica al upload).
//!
//! Backoff lineal: `backoff * intento` (intento empieza en 1), como el
//! `with_retry` de persistencia. La instrumentación nunca se reintenta: un
//! fallo ahí suele indicar un defecto real del binario.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Reintentos adicionales tras el primer intento.
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { max_retries: 0,
               backoff: Duration::ZERO }
    }

    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self { max_retries, backoff }
    }

    /// Número total de intentos permitidos.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// `true` si tras fallar el intento `attempt` (1-based) queda otro.
    pub fn allows_another(&self, attempt: u32) -> bool {
        attempt < self.max_attempts()
    }

    /// Espera antes del intento siguiente a `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

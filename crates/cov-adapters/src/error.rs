//! Errores de los adaptadores de procesos.

use std::io;

use cov_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl From<AdapterError> for CoreError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Spawn { program, source } => CoreError::Spawn { program,
                                                                          reason: source.to_string() },
            AdapterError::Wait { source, .. } => CoreError::Io(source),
        }
    }
}

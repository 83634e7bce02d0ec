//! Builder para `CoverageRunner`.
//!
//! Valida en `build` lo que no puede expresarse en tipos: debe haber un
//! instrumentador, `jobs >= 1`, y un uploader si el upload está habilitado.

use crate::engine::{CoverageRunner, RunSettings, UploadPolicy};
use crate::errors::CoreError;
use crate::event::EventStore;
use crate::external::{Instrumenter, Uploader};

pub struct CoverageRunnerBuilder<E: EventStore> {
    settings: RunSettings,
    event_store: E,
    instrumenter: Option<Box<dyn Instrumenter>>,
    uploader: Option<Box<dyn Uploader>>,
}

impl<E: EventStore> CoverageRunnerBuilder<E> {
    pub(crate) fn new(settings: RunSettings, event_store: E) -> Self {
        Self { settings,
               event_store,
               instrumenter: None,
               uploader: None }
    }

    pub fn instrumenter(mut self, instrumenter: impl Instrumenter + 'static) -> Self {
        self.instrumenter = Some(Box::new(instrumenter));
        self
    }

    pub fn uploader(mut self, uploader: impl Uploader + 'static) -> Self {
        self.uploader = Some(Box::new(uploader));
        self
    }

    pub fn build(self) -> Result<CoverageRunner<E>, CoreError> {
        let instrumenter = self.instrumenter
                               .ok_or_else(|| CoreError::Config("no instrumenter configured".into()))?;
        if self.settings.jobs == 0 {
            return Err(CoreError::Config("jobs must be at least 1".into()));
        }
        if self.settings.upload != UploadPolicy::Disabled && self.uploader.is_none() {
            return Err(CoreError::Config("upload is enabled but no uploader is configured".into()));
        }
        Ok(CoverageRunner::from_parts(self.settings, self.event_store, instrumenter, self.uploader))
    }
}

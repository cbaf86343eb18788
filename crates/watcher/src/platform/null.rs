//! No-op backend for platforms without native change notification

use crate::backend::{ChangeBackend, PollOutcome, WatchTarget};
use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Backend that accepts every watch and never reports a change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ChangeBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn watch(&mut self, path: &Path) -> Result<()> {
        debug!(
            "No native change notification available; ignoring watch of {}",
            path.display()
        );
        Ok(())
    }

    fn unwatch(&mut self) {}

    fn poll(&mut self) -> PollOutcome {
        PollOutcome::Idle
    }

    fn target(&self) -> Option<&WatchTarget> {
        None
    }
}

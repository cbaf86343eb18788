//! Native backend built on the platform's recommended notify watcher
//! (inotify, FSEvents or ReadDirectoryChangesW).

mod coalesce;
pub mod path;

use self::coalesce::{EventQueue, WatchRoot, EVENT_QUEUE_CAPACITY};
use crate::backend::{ChangeBackend, PollOutcome, WatchTarget};
use crate::error::{Result, WatchError};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// A live subscription. Dropping it closes the native handle.
struct NativeHandle {
    target: WatchTarget,
    queue: EventQueue,
    // Kept for its Drop; releases the OS subscription
    _watcher: RecommendedWatcher,
}

/// Change backend backed by the OS notification facility.
///
/// Holds at most one subscription: `Idle` when `handle` is `None`,
/// `Watching` otherwise.
#[derive(Default)]
pub struct NotifyBackend {
    handle: Option<NativeHandle>,
}

impl NotifyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribe(dir: &Path) -> Result<NativeHandle> {
        let native = path::encode(dir)?;

        if !native.is_dir() {
            return Err(WatchError::NotADirectory { path: native });
        }
        let canonical = native
            .canonicalize()
            .map_err(|e| WatchError::subscription(&native, e))?;

        let root = WatchRoot::new(native.clone(), canonical);
        let (sink, queue) = coalesce::event_queue(root, EVENT_QUEUE_CAPACITY);
        let mut watcher =
            notify::recommended_watcher(sink).map_err(|e| WatchError::subscription(&native, e))?;

        watcher
            .watch(&native, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::subscription(&native, e))?;

        Ok(NativeHandle {
            target: WatchTarget::new(native),
            queue,
            _watcher: watcher,
        })
    }
}

impl ChangeBackend for NotifyBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn watch(&mut self, path: &Path) -> Result<()> {
        // Old subscription goes first so two handles never coexist
        self.unwatch();

        let handle = Self::subscribe(path)?;
        info!("Watching {} for changes", handle.target.path().display());
        self.handle = Some(handle);
        Ok(())
    }

    fn unwatch(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Released watch on {}", handle.target.path().display());
        }
    }

    fn poll(&mut self) -> PollOutcome {
        let Some(handle) = self.handle.as_mut() else {
            return PollOutcome::Idle;
        };

        let drained = handle.queue.drain();
        let watched = handle.target.path().to_path_buf();

        for err in &drained.errors {
            warn!(
                "Change subscription for {} reported an error, changes may be missed: {}",
                watched.display(),
                err
            );
        }

        if drained.overflowed {
            debug!(
                "Event queue for {} filled up, extra events folded into one change",
                watched.display()
            );
        }

        if drained.changed() {
            debug!(
                "{} change event(s) in {} since last poll",
                drained.changes,
                watched.display()
            );
        }

        if drained.target_removed || drained.disconnected {
            error!(
                "Lost change subscription for {}; no further changes will be observed",
                watched.display()
            );
            self.handle = None;
        }

        if drained.changed() {
            PollOutcome::Changed(watched)
        } else if self.handle.is_some() {
            PollOutcome::Unchanged
        } else {
            PollOutcome::Idle
        }
    }

    fn target(&self) -> Option<&WatchTarget> {
        self.handle.as_ref().map(|h| &h.target)
    }
}

impl std::fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyBackend")
            .field("target", &self.target())
            .finish()
    }
}

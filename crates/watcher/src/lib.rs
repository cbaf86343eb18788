//! Directory change notification with a poll-driven contract
//!
//! This crate lets a long-running process learn that a directory's contents
//! changed without writing any platform-specific code:
//! - One facade, [`DirectoryWatcher`], on every platform
//! - A native backend where the OS offers change notification
//! - A no-op backend everywhere else, so callers never need `cfg`
//! - Bursts of changes between two polls coalesced into one callback
//!
//! ```no_run
//! use dirwatch::DirectoryWatcher;
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let listener = Arc::new(|path: &Path| println!("{} changed", path.display()));
//!
//! let mut watcher = DirectoryWatcher::new();
//! watcher.set_callback(&listener);
//! watcher.watch("assets")?;
//!
//! loop {
//!     watcher.process();
//!     std::thread::sleep(Duration::from_secs(2));
//! }
//! # Ok::<(), dirwatch::WatchError>(())
//! ```

pub mod backend;
pub mod error;
pub mod listener;
pub mod platform;

pub use backend::{ChangeBackend, PollOutcome, WatchTarget};
pub use error::{EncodingReason, Result, WatchError};
pub use listener::DirectoryListener;
pub use platform::{NullBackend, PlatformBackend};

use std::path::Path;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Watches one directory and calls back a listener when it changes.
///
/// The watcher never schedules itself: call [`process`](Self::process) from
/// your own loop at whatever interval suits you. The backend is fixed by the
/// type parameter for the watcher's whole lifetime.
pub struct DirectoryWatcher<B: ChangeBackend = PlatformBackend> {
    backend: B,
    listener: Option<Weak<dyn DirectoryListener>>,
}

impl DirectoryWatcher {
    /// Create a watcher using this platform's backend
    pub fn new() -> Self {
        Self::with_backend(PlatformBackend::default())
    }
}

impl Default for DirectoryWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ChangeBackend> DirectoryWatcher<B> {
    /// Create a watcher over an explicit backend
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            listener: None,
        }
    }

    /// Set the listener that receives change callbacks.
    ///
    /// Only a weak reference is kept. Replacing a listener just overwrites it.
    pub fn set_callback<L: DirectoryListener + 'static>(&mut self, listener: &Arc<L>) {
        let weak: Weak<dyn DirectoryListener> = Arc::<L>::downgrade(listener);
        self.listener = Some(weak);
    }

    /// Stop watching any previous directory and start watching `path`.
    ///
    /// On failure the watcher is left not watching anything.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.backend.watch(path).map_err(|err| {
            warn!("Failed to watch {}: {}", path.display(), err);
            err
        })
    }

    /// Stop watching. No-op when idle.
    pub fn unwatch(&mut self) {
        self.backend.unwatch();
    }

    /// Check once for changes and invoke the listener if there were any.
    ///
    /// Never blocks and never fails. Multiple changes since the previous call
    /// produce a single callback carrying the watched path.
    pub fn process(&mut self) {
        let PollOutcome::Changed(path) = self.backend.poll() else {
            return;
        };

        match self.listener.as_ref().and_then(Weak::upgrade) {
            Some(listener) => listener.on_dir_changed(&path),
            None => debug!("{}; change dropped", WatchError::ListenerAbsent { path }),
        }
    }

    pub fn is_watching(&self) -> bool {
        self.backend.is_watching()
    }

    pub fn watched_path(&self) -> Option<&Path> {
        self.backend.target().map(WatchTarget::path)
    }

    /// Which backend variant this watcher runs on
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

impl<B: ChangeBackend> std::fmt::Debug for DirectoryWatcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("backend", &self.backend.name())
            .field("watching", &self.watched_path())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

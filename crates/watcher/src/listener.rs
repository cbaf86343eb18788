//! Change listener capability

use std::path::Path;

/// Receives a callback when a watched directory has changed.
///
/// The watcher only keeps a weak reference to its listener; the caller owns it
/// and decides how long it lives. Once the caller drops the last `Arc`, the
/// watcher treats the listener as absent and stops invoking it.
pub trait DirectoryListener: Send + Sync {
    /// Called once per `process` call that observed one or more changes.
    ///
    /// `path` is the watched directory, not the entry that changed.
    fn on_dir_changed(&self, path: &Path);
}

impl<F> DirectoryListener for F
where
    F: Fn(&Path) + Send + Sync,
{
    fn on_dir_changed(&self, path: &Path) {
        self(path)
    }
}

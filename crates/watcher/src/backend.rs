//! Backend contract shared by every platform variant

use crate::error::Result;
use std::path::{Path, PathBuf};

/// The directory a backend is observing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    /// Path in the form handed to the native API
    path: PathBuf,
    /// Subdirectories are never included
    recursive: bool,
}

impl WatchTarget {
    /// Create a non-recursive target for an already encoded path
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            recursive: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }
}

/// Result of one non-blocking check against a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// No watch is active
    Idle,
    /// Watching, nothing happened since the last poll
    Unchanged,
    /// At least one change since the last poll, carrying the watched path
    Changed(PathBuf),
}

/// A platform-specific source of directory change notifications.
///
/// Implementations own at most one native subscription. `poll` must return
/// immediately and leave the subscription armed for the next change.
pub trait ChangeBackend {
    /// Short label used in diagnostics
    fn name(&self) -> &'static str;

    /// Start observing `path`, retiring any existing subscription first.
    ///
    /// On error the backend is left idle.
    fn watch(&mut self, path: &Path) -> Result<()>;

    /// Release the active subscription, if any.
    fn unwatch(&mut self);

    /// Check once for changes without blocking.
    fn poll(&mut self) -> PollOutcome;

    /// The live target, if watching
    fn target(&self) -> Option<&WatchTarget>;

    fn is_watching(&self) -> bool {
        self.target().is_some()
    }
}

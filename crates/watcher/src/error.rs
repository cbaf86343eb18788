//! Error types for directory watching.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher operations.
///
/// None of these are fatal: a failed `watch` leaves the watcher idle and
/// `process` only ever logs them.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Cannot encode path {path} for native watch: {reason}")]
    PathEncoding {
        path: PathBuf,
        reason: EncodingReason,
    },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to subscribe to changes in {path}: {reason}")]
    Subscription { path: PathBuf, reason: String },

    #[error("Change detected in {path} but no listener is registered")]
    ListenerAbsent { path: PathBuf },
}

/// Why a path could not be converted to the native representation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingReason {
    #[error("path is empty")]
    Empty,

    #[error("path contains an interior NUL")]
    InteriorNul,

    #[error("path is {len} units long, native limit is {max} including terminator")]
    TooLong { len: usize, max: usize },
}

impl WatchError {
    pub(crate) fn subscription(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        WatchError::Subscription {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Result type for watcher operations
pub type Result<T> = std::result::Result<T, WatchError>;

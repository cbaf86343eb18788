//! Platform-specific backend selection
//!
//! Exactly one backend is compiled in as [`PlatformBackend`]. Targets with a
//! native notification facility get `NotifyBackend`; everything else, or any
//! build with the `null-backend` feature, gets [`NullBackend`].

mod null;

pub use null::NullBackend;

#[cfg(all(
    any(target_os = "linux", target_os = "android", target_os = "macos", target_os = "windows"),
    not(feature = "null-backend")
))]
mod native;

// PlatformBackend is what `DirectoryWatcher::new()` uses on this build
#[cfg(all(
    any(target_os = "linux", target_os = "android", target_os = "macos", target_os = "windows"),
    not(feature = "null-backend")
))]
pub use native::{path as native_path, NotifyBackend, NotifyBackend as PlatformBackend};

#[cfg(not(all(
    any(target_os = "linux", target_os = "android", target_os = "macos", target_os = "windows"),
    not(feature = "null-backend")
)))]
pub use null::NullBackend as PlatformBackend;

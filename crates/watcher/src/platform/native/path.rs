//! Conversion of caller paths into the fixed-size native representation
//!
//! The native APIs take paths through a bounded buffer. Anything that does not
//! fit is rejected here; truncating would silently watch some other directory.

use crate::error::{EncodingReason, Result, WatchError};
use std::path::{Path, PathBuf};

/// Native buffer size in code units, including the terminating NUL
#[cfg(windows)]
pub const MAX_NATIVE_PATH: usize = 260;
#[cfg(target_os = "macos")]
pub const MAX_NATIVE_PATH: usize = 1024;
#[cfg(not(any(windows, target_os = "macos")))]
pub const MAX_NATIVE_PATH: usize = 4096;

/// Validate `path` against the native encoding and return the form to watch.
pub fn encode(path: &Path) -> Result<PathBuf> {
    let units = native_units(path);

    if units.is_empty() {
        return Err(rejected(path, EncodingReason::Empty));
    }
    if units.contains(&0) {
        return Err(rejected(path, EncodingReason::InteriorNul));
    }
    // One slot is reserved for the terminator
    if units.len() + 1 > MAX_NATIVE_PATH {
        return Err(rejected(
            path,
            EncodingReason::TooLong {
                len: units.len(),
                max: MAX_NATIVE_PATH,
            },
        ));
    }

    Ok(path.to_path_buf())
}

#[cfg(windows)]
fn native_units(path: &Path) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    path.as_os_str().encode_wide().collect()
}

#[cfg(unix)]
fn native_units(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

fn rejected(path: &Path, reason: EncodingReason) -> WatchError {
    WatchError::PathEncoding {
        path: path.to_path_buf(),
        reason,
    }
}

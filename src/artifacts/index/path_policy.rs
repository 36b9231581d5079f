//! Staging path policy
//!
//! Only plain relative paths inside the working tree may be staged: no `..`
//! components, no `//`, no trailing `/`, no absolute paths and no hidden
//! files (which also keeps the storage root itself out of the index).

use crate::error::{Error, Result};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Paths are stored with a 2-byte length prefix
pub const MAX_PATH_SIZE: usize = u16::MAX as usize;

pub fn verify_path(path: &Path) -> Result<()> {
    let bytes = path.as_os_str().as_bytes();
    let invalid = || Error::InvalidPath(path.to_path_buf());

    if bytes.is_empty() || bytes.len() > MAX_PATH_SIZE || bytes.contains(&0) {
        return Err(invalid());
    }

    // an empty segment covers leading, trailing and doubled slashes
    let unsafe_segment = bytes
        .split(|&b| b == b'/')
        .any(|segment| segment.is_empty() || segment.starts_with(b"."));
    if unsafe_segment {
        return Err(invalid());
    }

    Ok(())
}

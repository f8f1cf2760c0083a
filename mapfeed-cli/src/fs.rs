//! Capability-based filesystem checks for CLI inputs.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Return whether `path` exists and is a regular file.
///
/// The parent directory is opened with ambient authority and the file is
/// inspected relative to it.
pub(crate) fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.metadata(name).map(|metadata| metadata.is_file())
}

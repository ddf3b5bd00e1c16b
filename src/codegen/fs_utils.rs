//! Filesystem utilities for code generation

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Write content to a file atomically, creating parent directories if needed.
///
/// The content goes to a temporary file in the target directory first and is
/// renamed over `path` once fully written, so readers never observe a
/// partially written file.
pub fn write_atomic<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".cqlgen-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(contents.as_ref())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

//! Idempotent file writes.
//!
//! Regenerating a site from unchanged inputs must not touch the filesystem:
//! unchanged mtimes keep the downstream site build and version control
//! quiet. [`write_if_changed`] is the only way generated documents reach
//! disk.

use crate::types::WriteStatus;
use std::fs;
use std::io;
use std::path::Path;

/// Write `content` to `path` unless the file already holds exactly it.
///
/// - identical bytes on disk → [`WriteStatus::Unchanged`] (read only)
/// - otherwise with `dry_run` → [`WriteStatus::DryRun`] (nothing touched)
/// - otherwise → parent directories created, file written, [`WriteStatus::Written`]
pub fn write_if_changed(path: &Path, content: &str, dry_run: bool) -> io::Result<WriteStatus> {
    match fs::read(path) {
        Ok(existing) if existing == content.as_bytes() => return Ok(WriteStatus::Unchanged),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    if dry_run {
        return Ok(WriteStatus::DryRun);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(WriteStatus::Written)
}

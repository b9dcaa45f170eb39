//! Atomic filesystem primitives.
//!
//! The only core operation that mutates persistent state is the
//! configuration write path, and the game may be running while we write.
//! Every write therefore goes to a sibling temporary file, is synced, and
//! atomically replaces the target, so a reader never observes a half-written
//! file and a crash mid-write leaves the original intact.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;

/// Atomically replace `path` with `contents`.
///
/// The temporary file is created in the target's directory (rename is only
/// atomic within one filesystem). The parent directory is created when
/// missing. On every error path the temporary file is removed.
pub fn atomic_write(path: &Utf8Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => Utf8Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {parent}"))?;
    }

    let mut temp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("Failed to create temporary file in {parent}"))?;

    temp.write_all(contents)
        .with_context(|| format!("Failed to write temporary file for {path}"))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temporary file for {path}"))?;

    // TempPath removes the file on drop if the rename never happens.
    let temp_path = temp.into_temp_path();
    replace(&temp_path, path)?;

    tracing::debug!("Atomically replaced {}", path);
    Ok(())
}

/// Convenience wrapper for string content.
pub fn atomic_write_str(path: &Utf8Path, contents: &str) -> Result<()> {
    atomic_write(path, contents.as_bytes())
}

#[cfg(unix)]
fn replace(temp: &tempfile::TempPath, target: &Utf8Path) -> Result<()> {
    // rename() atomically replaces an existing destination on POSIX.
    fs::rename(temp, target).with_context(|| format!("Failed to replace {target}"))
}

#[cfg(windows)]
fn replace(temp: &tempfile::TempPath, target: &Utf8Path) -> Result<()> {
    // rename() does not replace an existing destination on Windows; fall
    // back to remove-then-rename, accepting a tiny non-atomic window.
    match fs::rename(temp, target) {
        Ok(()) => Ok(()),
        Err(_) if target.exists() => {
            fs::remove_file(target)
                .with_context(|| format!("Failed to remove existing {target}"))?;
            fs::rename(temp, target).with_context(|| format!("Failed to replace {target}"))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to replace {target}")),
    }
}

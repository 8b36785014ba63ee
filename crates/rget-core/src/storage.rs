//! Partial-file lifecycle: naming, sequential writes, atomic promotion.
//!
//! An in-progress download lives next to its final path under a recognizable
//! prefix; promotion is a rename, so a partially transferred file is never
//! visible under its final name.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;

/// Prefix applied to the final filename while the download is in progress.
/// Also how a later run recognizes a resumable partial.
pub const PARTIAL_PREFIX: &str = ".rget-part.";

/// Partial path for a final path: same directory, prefixed filename
/// (e.g. `dir/a.bin` → `dir/.rget-part.a.bin`).
pub fn partial_path(final_path: &Path) -> PathBuf {
    let mut name = OsString::from(PARTIAL_PREFIX);
    name.push(final_path.file_name().unwrap_or_default());
    final_path.with_file_name(name)
}

/// Stat a path, mapping "does not exist" to `None`.
pub async fn stat_optional(path: &Path) -> Result<Option<std::fs::Metadata>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to stat {}", path.display())),
    }
}

/// Sequential writer for a partial file.
pub struct PartialWriter {
    file: tokio::fs::File,
    path: PathBuf,
}

impl PartialWriter {
    /// Opens the partial for appending (resume) or truncating (fresh start).
    /// The file is created if missing either way.
    pub async fn open(path: &Path, resume: bool) -> Result<Self> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true);
        if resume {
            options.append(true);
        } else {
            options.truncate(true);
        }
        let file = options
            .open(path)
            .await
            .with_context(|| format!("failed to open partial file {}", path.display()))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .write_all(data)
            .await
            .with_context(|| format!("failed to write partial file {}", self.path.display()))
    }

    /// Flushes to disk and closes the handle. The size check that follows
    /// must see every written byte.
    pub async fn finish(mut self) -> Result<()> {
        self.file.flush().await?;
        self.file
            .sync_all()
            .await
            .with_context(|| format!("failed to sync partial file {}", self.path.display()))
    }
}

/// Applies a server modification time to the partial before promotion.
pub fn set_modified(path: &Path, modified: SystemTime) -> Result<()> {
    let mtime = filetime::FileTime::from_system_time(modified);
    filetime::set_file_mtime(path, mtime)
        .with_context(|| format!("failed to set mtime on {}", path.display()))
}

/// Atomically renames the verified partial to its final name. The single
/// commit point of a download.
pub async fn promote(partial: &Path, final_path: &Path) -> Result<()> {
    tokio::fs::rename(partial, final_path)
        .await
        .with_context(|| {
            format!(
                "failed to rename {} to {}",
                partial.display(),
                final_path.display()
            )
        })
}

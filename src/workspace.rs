//! Per-request scratch directory.
//!
//! Each request gets its own uniquely named directory. It is removed when the
//! [`Workspace`] is dropped, so every early return cleans up too.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create `<root>/<prefix><random>`.
    pub fn create(root: &Path, prefix: &str) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(root)?;
        log::debug!("[Workspace] Created {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write an input file readable only by the service user.
    pub async fn write(&self, name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.path(name);
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, contents).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;
        Ok(path)
    }

    /// Remove the directory now and report failure.
    ///
    /// Dropping does the same but can only log.
    pub fn close(self) -> std::io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        log::debug!("[Workspace] Removed {}", path.display());
        Ok(())
    }
}

//! Per-upload staging on local disk.
//!
//! Each upload gets its own directory under the staging root. The directory, and everything
//! written into it, is removed when the [`StagedFile`] is disposed or dropped, so an early
//! return anywhere in the request still cleans up.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

use crate::error::{ProcessingError, ProcessingResult};

const STAGING_DIR_PREFIX: &str = "tubely-upload-";

#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `body` to a fresh staging directory, failing once more than `max_bytes` arrive.
    pub async fn stage<S>(
        &self,
        file_name: &str,
        body: S,
        max_bytes: u64,
    ) -> ProcessingResult<StagedFile>
    where
        S: Stream<Item = Result<Bytes, ProcessingError>> + Send,
    {
        tokio::fs::create_dir_all(&self.root).await?;
        let root = self.root.clone();
        let dir = blocking(move || {
            tempfile::Builder::new()
                .prefix(STAGING_DIR_PREFIX)
                .tempdir_in(root)
        })
        .await?;

        let name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("upload");
        let path = dir.path().join(name);

        // Declared after `dir`, so the handle is closed before the directory is removed.
        let mut file = tokio::fs::File::create(&path).await?;
        let mut body = std::pin::pin!(body);
        let mut size: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            size += chunk.len() as u64;
            if size > max_bytes {
                tracing::debug!(limit = max_bytes, "Upload exceeded size limit while staging");
                return Err(ProcessingError::PayloadTooLarge { limit: max_bytes });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        file.sync_all().await?;

        tracing::debug!(path = %path.display(), size_bytes = size, "Upload staged");

        Ok(StagedFile { dir, path, size })
    }
}

/// Run a blocking filesystem call off the async workers.
async fn blocking<T, F>(f: F) -> std::io::Result<T>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(std::io::Error::other)?
}

/// Bytes of one upload on disk, owned by the request that staged them.
#[derive(Debug)]
pub struct StagedFile {
    dir: TempDir,
    path: PathBuf,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Open an independent read handle positioned at the start of the file.
    pub async fn reopen(&self) -> ProcessingResult<tokio::fs::File> {
        Ok(tokio::fs::File::open(&self.path).await?)
    }

    /// Path for a derived file inside the same staging directory
    pub fn sibling(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the staging directory and everything in it.
    pub async fn dispose(self) -> ProcessingResult<()> {
        let dir = self.dir.path().to_path_buf();
        let handle = self.dir;
        blocking(move || handle.close()).await?;
        tracing::debug!(path = %dir.display(), "Staging directory removed");
        Ok(())
    }
}

/// A file derived from a [`StagedFile`], removed on dispose or drop.
///
/// Borrows the staged file so it can never outlive its staging directory.
#[derive(Debug)]
pub struct ProcessedFile<'a> {
    path: PathBuf,
    removed: bool,
    _staged: PhantomData<&'a StagedFile>,
}

impl<'a> ProcessedFile<'a> {
    pub(crate) fn reserve(staged: &'a StagedFile, name: &str) -> Self {
        Self {
            path: staged.sibling(name),
            removed: false,
            _staged: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn size(&self) -> ProcessingResult<u64> {
        Ok(tokio::fs::metadata(&self.path).await?.len())
    }

    pub async fn reopen(&self) -> ProcessingResult<tokio::fs::File> {
        Ok(tokio::fs::File::open(&self.path).await?)
    }

    pub async fn dispose(mut self) -> ProcessingResult<()> {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for ProcessedFile<'_> {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %self.path.display(), "Failed to remove processed file");
            }
        }
    }
}

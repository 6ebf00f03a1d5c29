//! Download sinks: where a finished export ends up.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::info;

use crate::export::ExportError;

#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Stores `data` under `filename` and returns where it went.
    async fn deliver(&self, filename: &str, data: Bytes) -> Result<PathBuf, ExportError>;

    /// Removes a file this sink delivered earlier in the same export.
    async fn discard(&self, path: &Path) -> Result<(), ExportError>;
}

/// Writes files into a directory. Each file is written to a temporary file in the
/// same directory and renamed into place, so a failed export leaves nothing behind.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn write_atomic(dir: &Path, filename: &str, data: &[u8]) -> Result<PathBuf, ExportError> {
    let target = dir.join(filename);
    std::fs::create_dir_all(dir)
        .map_err(|e| ExportError::Delivery(format!("creating {}: {e}", dir.display())))?;
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| ExportError::Delivery(format!("creating temp file: {e}")))?;
    tmp.write_all(data)
        .and_then(|_| tmp.flush())
        .map_err(|e| ExportError::Delivery(format!("writing {filename}: {e}")))?;
    tmp.persist(&target)
        .map_err(|e| ExportError::Delivery(format!("saving {}: {}", target.display(), e.error)))?;
    Ok(target)
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, filename: &str, data: Bytes) -> Result<PathBuf, ExportError> {
        let dir = self.dir.clone();
        let name = filename.to_string();
        let len = data.len();
        let path = tokio::task::spawn_blocking(move || write_atomic(&dir, &name, &data))
            .await
            .map_err(|e| ExportError::Delivery(format!("write task failed: {e}")))??;
        info!(path = %path.display(), bytes = len, "File delivered");
        Ok(path)
    }

    async fn discard(&self, path: &Path) -> Result<(), ExportError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!(path = %path.display(), "File discarded");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ExportError::Delivery(format!(
                "removing {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_deliver_writes_file() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path());
        let path = sink
            .deliver("Jane_Doe_resume.pdf", Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("Jane_Doe_resume.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_deliver_overwrites_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path());
        sink.deliver("a.pdf", Bytes::from_static(b"one")).await.unwrap();
        sink.deliver("a.pdf", Bytes::from_static(b"two")).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(std::fs::read(dir.path().join("a.pdf")).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_deliver_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out").join("pdfs");
        let sink = DirectorySink::new(&nested);
        sink.deliver("x.pdf", Bytes::from_static(b"x")).await.unwrap();
        assert!(nested.join("x.pdf").exists());
    }

    #[tokio::test]
    async fn test_discard_removes_delivered_file() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path());
        let path = sink.deliver("a.pdf", Bytes::from_static(b"a")).await.unwrap();

        sink.discard(&path).await.unwrap();
        assert!(!path.exists());
        // Already gone is fine.
        sink.discard(&path).await.unwrap();
    }
}

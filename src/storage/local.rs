//! Local filesystem storage implementation.
//!
//! The snapshot is written to a temp file next to the target and renamed
//! over it, so readers only ever see a complete file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::storage::{SnapshotSink, WriteSummary};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage writing the snapshot to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl SnapshotSink for LocalStorage {
    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<WriteSummary> {
        let bytes = snapshot.to_json()?;
        self.write_bytes(&bytes).await?;

        log::info!(
            "Snapshot: {} records ({} available) written to {}",
            snapshot.total_count,
            snapshot.available_count,
            self.path.display()
        );

        Ok(WriteSummary {
            location: self.path.display().to_string(),
            bytes: bytes.len(),
            total_count: snapshot.total_count,
            available_count: snapshot.available_count,
            timestamp: Utc::now(),
        })
    }

    async fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        match self.read_bytes().await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

//! Local copies of captured frames for debugging

use crate::config::SnapshotNaming;
use crate::error::VisionError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Writes encoded frames into a directory
pub struct SnapshotWriter {
    dir: PathBuf,
    naming: SnapshotNaming,
    next_index: AtomicU64,
}

impl SnapshotWriter {
    /// Open (and create) the snapshot directory, optionally emptying it first.
    pub fn open(
        dir: impl Into<PathBuf>,
        naming: SnapshotNaming,
        clear: bool,
    ) -> Result<Self, VisionError> {
        let dir = dir.into();
        if clear && dir.exists() {
            std::fs::remove_dir_all(&dir)?;
            info!("Cleared snapshot directory {}", dir.display());
        }
        std::fs::create_dir_all(&dir)?;

        let next = highest_index(&dir)?.map(|i| i + 1).unwrap_or(0);
        Ok(Self {
            dir,
            naming,
            next_index: AtomicU64::new(next),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the next snapshot taken at `captured_at` will be written to
    pub fn next_path(&self, captured_at: DateTime<Utc>) -> PathBuf {
        match self.naming {
            SnapshotNaming::Timestamp => self
                .dir
                .join(format!("{}.jpg", captured_at.format("%Y%m%d-%H%M%S%.3f"))),
            SnapshotNaming::Sequential => {
                self.dir.join(format!("{}.jpg", self.next_index.fetch_add(1, Ordering::Relaxed)))
            }
        }
    }

    /// Write one encoded frame
    pub async fn write(&self, captured_at: DateTime<Utc>, jpeg: &[u8]) -> Result<PathBuf, VisionError> {
        let path = self.next_path(captured_at);
        tokio::fs::write(&path, jpeg).await?;
        debug!("Snapshot written to {}", path.display());
        Ok(path)
    }
}

fn highest_index(dir: &Path) -> Result<Option<u64>, VisionError> {
    let mut highest = None;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jpg") {
            continue;
        }
        if let Some(index) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u64>().ok())
        {
            highest = Some(highest.map_or(index, |h: u64| h.max(index)));
        }
    }
    Ok(highest)
}

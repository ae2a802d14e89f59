//! Configuration for pisight-eye

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where frames come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraSource {
    /// Pi camera module through the libcamera still tool
    Rpicam { program: String },
    /// Re-read a fixed image file on every capture
    File { path: PathBuf },
}

impl Default for CameraSource {
    fn default() -> Self {
        CameraSource::Rpicam {
            program: "rpicam-still".to_string(),
        }
    }
}

/// File naming for debug snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotNaming {
    /// Named by capture time
    Timestamp,
    /// 0.jpg, 1.jpg, ... continuing from the highest existing index
    Sequential,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Frame source
    pub source: CameraSource,
    /// Sensor output resolution (width, height)
    pub resolution: (u32, u32),
    /// Exposure/white-balance settle time before the still is taken
    pub settle_ms: u64,
    /// Longer side after scaling; `None` sends the frame as captured
    pub target_max_dimension: Option<u32>,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Keep a copy of every frame here when set
    pub snapshot_dir: Option<PathBuf>,
    pub snapshot_naming: SnapshotNaming,
    /// Empty the snapshot directory at startup
    pub clear_snapshots_on_start: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: CameraSource::default(),
            resolution: (1024, 768),
            settle_ms: 500,
            target_max_dimension: Some(1000),
            jpeg_quality: 90,
            snapshot_dir: None,
            snapshot_naming: SnapshotNaming::Timestamp,
            clear_snapshots_on_start: false,
        }
    }
}

impl CameraConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.resolution.0 == 0 || self.resolution.1 == 0 {
            return Err("Resolution must be non-zero".to_string());
        }

        if self.resolution.0 > 7680 || self.resolution.1 > 4320 {
            return Err("Resolution too large (max 8K)".to_string());
        }

        if let Some(max) = self.target_max_dimension {
            if max == 0 || max > 10_000 {
                return Err("target_max_dimension must be between 1 and 10000".to_string());
            }
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err("JPEG quality must be between 1 and 100".to_string());
        }

        if self.settle_ms > 60_000 {
            return Err("settle_ms too large (max 60s)".to_string());
        }

        match &self.source {
            CameraSource::Rpicam { program } if program.trim().is_empty() => {
                Err("Camera program must not be empty".to_string())
            }
            CameraSource::File { path } if path.as_os_str().is_empty() => {
                Err("Camera image path must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

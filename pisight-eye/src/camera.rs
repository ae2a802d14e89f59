//! Still capture from the Pi camera module

use crate::config::{CameraConfig, CameraSource};
use crate::error::VisionError;
use crate::frame::CapturedImage;
use crate::processing::resize_to_max_dimension;
use async_trait::async_trait;
use chrono::Utc;
use image::{ImageFormat, RgbImage};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

/// Source of single still frames
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Expose and deliver one decoded frame
    async fn capture(&self) -> Result<RgbImage, VisionError>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// libcamera still tool writing a JPEG to stdout
pub struct RpicamStill {
    program: String,
    resolution: (u32, u32),
    settle_ms: u64,
}

impl RpicamStill {
    pub fn new(program: impl Into<String>, resolution: (u32, u32), settle_ms: u64) -> Self {
        Self {
            program: program.into(),
            resolution,
            settle_ms,
        }
    }

    /// Arguments passed to the still tool
    pub fn command_args(&self) -> Vec<String> {
        vec![
            "--nopreview".to_string(),
            "--timeout".to_string(),
            self.settle_ms.max(1).to_string(),
            "--width".to_string(),
            self.resolution.0.to_string(),
            "--height".to_string(),
            self.resolution.1.to_string(),
            "--encoding".to_string(),
            "jpg".to_string(),
            "--output".to_string(),
            "-".to_string(),
        ]
    }
}

#[async_trait]
impl CameraBackend for RpicamStill {
    async fn capture(&self) -> Result<RgbImage, VisionError> {
        let output = Command::new(&self.program)
            .args(self.command_args())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| VisionError::Camera(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VisionError::Camera(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(VisionError::Camera(format!("{} produced no image data", self.program)));
        }

        let decoded = image::load_from_memory_with_format(&output.stdout, ImageFormat::Jpeg)
            .map_err(|e| VisionError::Camera(format!("Failed to decode frame: {}", e)))?;
        Ok(decoded.to_rgb8())
    }

    fn name(&self) -> &str {
        "rpicam"
    }
}

/// Serves the same image file on every capture
pub struct StillImageFile {
    path: PathBuf,
}

impl StillImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CameraBackend for StillImageFile {
    async fn capture(&self) -> Result<RgbImage, VisionError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            VisionError::Camera(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| VisionError::Camera(format!("Failed to decode {}: {}", self.path.display(), e)))?;
        Ok(decoded.to_rgb8())
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Camera manager: one frame per call, scaled as configured
pub struct CameraManager {
    config: Arc<CameraConfig>,
    backend: Arc<dyn CameraBackend>,
    captures: AtomicU64,
}

impl CameraManager {
    /// Create a camera manager for the configured source
    pub fn new(config: Arc<CameraConfig>) -> Result<Self, VisionError> {
        config.validate().map_err(VisionError::Config)?;

        let backend: Arc<dyn CameraBackend> = match &config.source {
            CameraSource::Rpicam { program } => Arc::new(RpicamStill::new(
                program.clone(),
                config.resolution,
                config.settle_ms,
            )),
            CameraSource::File { path } => Arc::new(StillImageFile::new(path.clone())),
        };

        info!(
            "Camera ready ({} backend, {}x{})",
            backend.name(),
            config.resolution.0,
            config.resolution.1
        );
        Ok(Self::with_backend(config, backend))
    }

    /// Create a camera manager around an explicit backend
    pub fn with_backend(config: Arc<CameraConfig>, backend: Arc<dyn CameraBackend>) -> Self {
        Self {
            config,
            backend,
            captures: AtomicU64::new(0),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Capture using the configured target dimension
    pub async fn capture(&self) -> Result<CapturedImage, VisionError> {
        self.capture_image(self.config.target_max_dimension).await
    }

    /// Capture one still and optionally rescale its longer side.
    ///
    /// No retry: a backend fault fails this call.
    pub async fn capture_image(
        &self,
        target_max_dimension: Option<u32>,
    ) -> Result<CapturedImage, VisionError> {
        let start = Instant::now();
        let raw = self.backend.capture().await?;

        if raw.width() == 0 || raw.height() == 0 {
            return Err(VisionError::Camera("Camera delivered an empty frame".to_string()));
        }
        let source_dimensions = raw.dimensions();

        let pixels = match target_max_dimension {
            Some(max) => tokio::task::spawn_blocking(move || resize_to_max_dimension(&raw, max))
                .await
                .map_err(|e| VisionError::Processing(format!("Resize task failed: {}", e)))??,
            None => raw,
        };

        let count = self.captures.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            "Capture #{} from {}: {}x{} -> {}x{} in {:?}",
            count,
            self.backend.name(),
            source_dimensions.0,
            source_dimensions.1,
            pixels.width(),
            pixels.height(),
            start.elapsed()
        );

        Ok(CapturedImage::new(pixels, Utc::now()))
    }

    /// Number of successful captures so far
    pub fn capture_count(&self) -> u64 {
        self.captures.load(Ordering::Relaxed)
    }
}

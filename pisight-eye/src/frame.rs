use crate::encoding::encode_jpeg;
use crate::error::VisionError;
use chrono::{DateTime, Utc};
use image::RgbImage;

/// One decoded still, RGB without alpha.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pixels: RgbImage,
    captured_at: DateTime<Utc>,
}

impl CapturedImage {
    pub fn new(pixels: RgbImage, captured_at: DateTime<Utc>) -> Self {
        Self { pixels, captured_at }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn channels(&self) -> u8 {
        3
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>, VisionError> {
        encode_jpeg(&self.pixels, quality)
    }
}

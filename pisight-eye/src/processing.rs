//! Image scaling

use crate::error::VisionError;
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Dimensions after scaling the longer side to `target_max_dimension`.
///
/// The shorter side is `round(short * target / long)`, rounding halves to
/// even, and never drops below one pixel.
pub fn scaled_dimensions(
    width: u32,
    height: u32,
    target_max_dimension: u32,
) -> Result<(u32, u32), VisionError> {
    if width == 0 || height == 0 {
        return Err(VisionError::Processing("Invalid image dimensions".to_string()));
    }
    if target_max_dimension == 0 {
        return Err(VisionError::Processing("Target dimension cannot be zero".to_string()));
    }

    let (long, short) = if width >= height { (width, height) } else { (height, width) };
    let scaled_short = round_half_even(
        u64::from(short) * u64::from(target_max_dimension),
        u64::from(long),
    );
    let scaled_short = u32::try_from(scaled_short.max(1))
        .map_err(|_| VisionError::Processing("Scaled dimension overflow".to_string()))?;

    if width >= height {
        Ok((target_max_dimension, scaled_short))
    } else {
        Ok((scaled_short, target_max_dimension))
    }
}

/// Rescale so the longer side equals `target_max_dimension`, keeping aspect ratio.
///
/// The triangle kernel is stretched by the scale factor on downscale, so every
/// source pixel contributes to the output the way an area filter would.
pub fn resize_to_max_dimension(
    image: &RgbImage,
    target_max_dimension: u32,
) -> Result<RgbImage, VisionError> {
    let (width, height) = scaled_dimensions(image.width(), image.height(), target_max_dimension)?;

    let total_pixels = u64::from(width) * u64::from(height);
    if total_pixels > 100_000_000 {
        return Err(VisionError::Processing(
            "Target dimensions too large (max 100M pixels)".to_string(),
        ));
    }

    if (width, height) == image.dimensions() {
        return Ok(image.clone());
    }

    Ok(imageops::resize(image, width, height, FilterType::Triangle))
}

fn round_half_even(numerator: u64, denominator: u64) -> u64 {
    let quotient = numerator / denominator;
    let twice_remainder = (numerator % denominator) * 2;
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

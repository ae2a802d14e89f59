use crate::error::VisionError;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage};

/// Encode an RGB frame as baseline JPEG.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, VisionError> {
    if quality == 0 || quality > 100 {
        return Err(VisionError::Encoding(format!("Invalid JPEG quality: {}", quality)));
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(VisionError::Encoding("Cannot encode an empty image".to_string()));
    }

    let mut buffer = Vec::with_capacity(image.as_raw().len() / 8);
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)
        .map_err(|e| VisionError::Encoding(format!("JPEG encoding failed: {}", e)))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_jpeg_markers() {
        let image = RgbImage::from_pixel(16, 8, image::Rgb([0, 128, 255]));
        let bytes = encode_jpeg(&image, 85).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encoded_dimensions_survive() {
        let image = RgbImage::from_pixel(40, 30, image::Rgb([10, 20, 30]));
        let bytes = encode_jpeg(&image, 90).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 40);
        assert_eq!(decoded.height(), 30);
    }

    #[test]
    fn test_invalid_quality() {
        let image = RgbImage::new(4, 4);
        assert!(encode_jpeg(&image, 0).is_err());
        assert!(encode_jpeg(&image, 101).is_err());
    }

    #[test]
    fn test_empty_image() {
        let image = RgbImage::new(0, 0);
        assert!(encode_jpeg(&image, 90).is_err());
    }
}

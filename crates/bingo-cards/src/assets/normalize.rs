//! Raster normalization
//!
//! Photos are auto-rotated from their orientation metadata and center-cropped
//! to a fixed square. Backgrounds are shrunk to fit the print bounds, never
//! enlarged. Both are re-encoded as JPEG.

use crate::types::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;

use super::{AssetKind, NormalizeSettings};

/// A re-encoded JPEG with its pixel dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Normalize raw bytes according to the asset kind
pub fn normalize_bytes(raw: &[u8], kind: AssetKind, settings: &NormalizeSettings) -> Result<EncodedImage> {
    match kind {
        AssetKind::Photo => normalize_photo_bytes(raw, settings.photo_size_px, settings.jpeg_quality),
        AssetKind::Background => {
            let (max_width, max_height) = settings.background_max_px;
            normalize_background_bytes(raw, max_width, max_height, settings.jpeg_quality)
        }
    }
}

/// Cover-fit a photo into a `size` x `size` square
pub fn normalize_photo_bytes(raw: &[u8], size: u32, quality: u8) -> Result<EncodedImage> {
    let image = decode_oriented(raw)?;
    let square = image.resize_to_fill(size, size, FilterType::Lanczos3);
    encode_jpeg(&square, quality)
}

/// Fit a background inside `max_width` x `max_height` without upscaling
pub fn normalize_background_bytes(
    raw: &[u8],
    max_width: u32,
    max_height: u32,
    quality: u8,
) -> Result<EncodedImage> {
    let image = decode_oriented(raw)?;
    let fitted = if image.width() > max_width || image.height() > max_height {
        image.resize(max_width, max_height, FilterType::Lanczos3)
    } else {
        image
    };
    encode_jpeg(&fitted, quality)
}

fn decode_oriented(raw: &[u8]) -> Result<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<EncodedImage> {
    // JPEG has no alpha channel
    let rgb = image.to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&rgb)?;

    Ok(EncodedImage {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([200, 30, 30])
            } else {
                Rgb([30, 30, 200])
            }
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_photo_is_cropped_square() {
        let encoded = normalize_photo_bytes(&png(60, 30), 16, 90).unwrap();
        assert_eq!((encoded.width, encoded.height), (16, 16));

        let decoded = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
        assert_eq!(
            image::guess_format(&encoded.bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_background_is_not_enlarged() {
        let encoded = normalize_background_bytes(&png(40, 20), 1754, 2480, 90).unwrap();
        assert_eq!((encoded.width, encoded.height), (40, 20));
    }

    #[test]
    fn test_background_fits_inside() {
        let encoded = normalize_background_bytes(&png(300, 100), 60, 80, 90).unwrap();
        assert_eq!((encoded.width, encoded.height), (60, 20));
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(normalize_photo_bytes(b"definitely not an image", 16, 90).is_err());
    }

    #[test]
    fn test_same_input_same_output() {
        let raw = png(32, 48);
        let a = normalize_photo_bytes(&raw, 20, 95).unwrap();
        let b = normalize_photo_bytes(&raw, 20, 95).unwrap();
        assert_eq!(a, b);
    }
}

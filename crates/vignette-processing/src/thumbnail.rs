//! Thumbnail rendering.
//!
//! The transform is a pure function of the input bytes and the configured
//! dimensions: the same original always produces the same thumbnail bytes
//! (modulo encoder changes across `image` crate versions), so a redelivered
//! event overwrites the derivative with equivalent content.

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

/// Thumbnail rendering errors
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}

/// Target bounding box for thumbnails. Static configuration, not per-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSpec {
    pub width: u32,
    pub height: u32,
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
        }
    }
}

/// Thumbnail renderer
pub struct Thumbnailer;

impl Thumbnailer {
    /// Render a JPEG thumbnail fitting within `spec`, preserving aspect ratio.
    ///
    /// The input format is sniffed from the bytes; the declared content type
    /// is advisory only. Images already smaller than the box are not
    /// upscaled by the resize (`image::DynamicImage::resize` keeps them).
    pub fn render(data: &[u8], spec: ThumbnailSpec) -> Result<Bytes, ThumbnailError> {
        let cursor = Cursor::new(data);
        let img = image::ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(|e| ThumbnailError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ThumbnailError::Decode(e.to_string()))?;

        let (orig_width, orig_height) = img.dimensions();
        let filter = Self::select_filter(orig_width, orig_height, spec.width, spec.height);
        let resized = img.resize(spec.width, spec.height, filter);

        let encoded = Self::encode_jpeg(&resized)?;

        tracing::debug!(
            orig_width = orig_width,
            orig_height = orig_height,
            thumb_width = resized.width(),
            thumb_height = resized.height(),
            thumb_bytes = encoded.len(),
            "Rendered thumbnail"
        );

        Ok(encoded)
    }

    /// Select filter type based on how aggressively the image is downscaled.
    fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }

    fn encode_jpeg(img: &DynamicImage) -> Result<Bytes, ThumbnailError> {
        let (width, height) = img.dimensions();
        let estimated_size = (width * height * 3) as usize;
        let mut buffer = Vec::with_capacity(estimated_size);
        let mut cursor = Cursor::new(&mut buffer);

        // JPEG encoding has no alpha channel; flatten first.
        img.to_rgb8()
            .write_to(&mut cursor, ImageFormat::Jpeg)
            .map_err(|e| ThumbnailError::Encode(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_render_fits_bounding_box() {
        let data = sample_png(1280, 960);
        let spec = ThumbnailSpec {
            width: 320,
            height: 240,
        };

        let thumb = Thumbnailer::render(&data, spec).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert!(decoded.width() <= 320);
        assert!(decoded.height() <= 240);
    }

    #[test]
    fn test_render_preserves_aspect_ratio() {
        let data = sample_png(1600, 400);
        let spec = ThumbnailSpec {
            width: 320,
            height: 240,
        };

        let thumb = Thumbnailer::render(&data, spec).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        // 4:1 original constrained by width
        assert_eq!(decoded.width(), 320);
        assert_eq!(decoded.height(), 80);
    }

    #[test]
    fn test_render_output_is_jpeg() {
        let data = sample_png(640, 480);
        let thumb = Thumbnailer::render(&data, ThumbnailSpec::default()).unwrap();
        assert_eq!(
            image::guess_format(&thumb).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let data = sample_png(800, 600);
        let spec = ThumbnailSpec::default();

        let first = Thumbnailer::render(&data, spec).unwrap();
        let second = Thumbnailer::render(&data, spec).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_rejects_non_image_bytes() {
        let err = Thumbnailer::render(b"not an image", ThumbnailSpec::default()).unwrap_err();
        assert!(matches!(err, ThumbnailError::Decode(_)));
    }
}

//! Pure Rust codec backend on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, BMP, GIF) | `image::ImageReader` with format guessing |
//! | Encode PNG / BMP / GIF | `DynamicImage::write_to` with RGBA8 |
//! | Encode JPEG | `JpegEncoder::new_with_quality` with RGB8 (no alpha) |
//!
//! Writes go through [`write_atomically`], so a failed encode never leaves a
//! truncated output behind.

use super::backend::{CodecError, ImageCodec, write_atomically};
use super::buffer::PixelBuffer;
use super::convert::TargetFormat;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Extensions the decoder is compiled for.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// `true` if `path` has one of [`SUPPORTED_EXTENSIONS`] (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct RustBackend {
    jpeg_quality: u8,
}

impl RustBackend {
    pub fn new() -> Self {
        Self { jpeg_quality: 90 }
    }

    /// JPEG quality, clamped to 1-100.
    pub fn with_jpeg_quality(quality: u8) -> Self {
        Self {
            jpeg_quality: quality.clamp(1, 100),
        }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, CodecError> {
    ImageReader::open(path)
        .map_err(|e| CodecError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| CodecError::io(path, e))?
        .decode()
        .map_err(|e| CodecError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn save_image(
    buffer: &PixelBuffer,
    format: TargetFormat,
    path: &Path,
    jpeg_quality: u8,
) -> Result<(), CodecError> {
    let encode_err = |e: image::ImageError| CodecError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let file = File::create(path).map_err(|e| CodecError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    let rgba = DynamicImage::ImageRgba8(buffer.as_rgba().clone());
    match format {
        TargetFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(rgba.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut writer, jpeg_quality);
            rgb.write_with_encoder(encoder).map_err(encode_err)?;
        }
        other => {
            rgba.write_to(&mut writer, other.image_format())
                .map_err(encode_err)?;
        }
    }

    writer.flush().map_err(|e| CodecError::io(path, e))
}

impl ImageCodec for RustBackend {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        load_image(path).map(PixelBuffer::from)
    }

    fn encode(
        &self,
        buffer: &PixelBuffer,
        format: TargetFormat,
        path: &Path,
    ) -> Result<(), CodecError> {
        let quality = self.jpeg_quality;
        write_atomically(path, |partial| save_image(buffer, format, partial, quality))
    }
}

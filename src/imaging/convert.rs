//! Format conversion: preparing a buffer for a target file format.
//!
//! The converter does not encode bytes. It decides what pixels the encoder
//! should receive:
//!
//! - target supports alpha, or the source is fully opaque → buffer passes
//!   through unchanged;
//! - target lacks alpha (JPEG) and the source has translucent pixels → the
//!   image is flattened onto an opaque background with source-over
//!   compositing.
//!
//! Byte-level encoding lives behind [`ImageCodec`](super::ImageCodec).

use super::buffer::PixelBuffer;
use super::calculations::composite_over;
use image::{ImageFormat, Rgb, Rgba};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Formats an image can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 4] = [
        TargetFormat::Png,
        TargetFormat::Jpeg,
        TargetFormat::Bmp,
        TargetFormat::Gif,
    ];

    /// Lowercase file extension used for output names.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Gif => "gif",
        }
    }

    pub fn supports_alpha(self) -> bool {
        !matches!(self, TargetFormat::Jpeg)
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::Bmp => ImageFormat::Bmp,
            TargetFormat::Gif => ImageFormat::Gif,
        }
    }
}

impl fmt::Display for TargetFormat {
    /// Uppercase tag, as shown to users (`PNG`, `JPEG`, ...).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_ascii_uppercase())
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    /// Case-insensitive; `jpg` is an alias for `jpeg`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(TargetFormat::Png),
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "bmp" => Ok(TargetFormat::Bmp),
            "gif" => Ok(TargetFormat::Gif),
            _ => Err(ConvertError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Format of a loaded source file, taken from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
    Unknown,
}

impl SourceFormat {
    /// Detect from the path's final extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse::<TargetFormat>().ok())
            .map(SourceFormat::from)
            .unwrap_or(SourceFormat::Unknown)
    }

    /// The writable format matching this source, if any.
    pub fn target(self) -> Option<TargetFormat> {
        match self {
            SourceFormat::Png => Some(TargetFormat::Png),
            SourceFormat::Jpeg => Some(TargetFormat::Jpeg),
            SourceFormat::Bmp => Some(TargetFormat::Bmp),
            SourceFormat::Gif => Some(TargetFormat::Gif),
            SourceFormat::Unknown => None,
        }
    }
}

impl From<TargetFormat> for SourceFormat {
    fn from(t: TargetFormat) -> Self {
        match t {
            TargetFormat::Png => SourceFormat::Png,
            TargetFormat::Jpeg => SourceFormat::Jpeg,
            TargetFormat::Bmp => SourceFormat::Bmp,
            TargetFormat::Gif => SourceFormat::Gif,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(t) => fmt::Display::fmt(&t, f),
            None => f.write_str("UNKNOWN"),
        }
    }
}

/// Default flattening background: white.
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Prepares buffers for a target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConverter {
    pub background: Rgb<u8>,
}

impl Default for FormatConverter {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl FormatConverter {
    pub fn with_background(background: Rgb<u8>) -> Self {
        Self { background }
    }

    /// Prepare `buffer` (decoded from a `source` file) for `target`.
    pub fn convert(
        &self,
        buffer: PixelBuffer,
        source: SourceFormat,
        target: TargetFormat,
    ) -> PixelBuffer {
        if target.supports_alpha() || !buffer.has_translucency() {
            return buffer;
        }
        debug!(%source, %target, "flattening alpha onto background");
        self.flatten(&buffer)
    }

    /// Like [`convert`](Self::convert), taking the target as user text.
    pub fn convert_named(
        &self,
        buffer: PixelBuffer,
        source: SourceFormat,
        target: &str,
    ) -> Result<PixelBuffer, ConvertError> {
        let target: TargetFormat = target.parse()?;
        Ok(self.convert(buffer, source, target))
    }

    /// Composite over the background; every output pixel is opaque.
    pub fn flatten(&self, buffer: &PixelBuffer) -> PixelBuffer {
        buffer.map_pixels(|px| {
            let Rgb([r, g, b]) = composite_over(px, self.background);
            Rgba([r, g, b, u8::MAX])
        })
    }
}

//! Decoded raster image held in memory.
//!
//! A [`PixelBuffer`] is an RGBA8 image with a fixed width and height. It is
//! immutable once built: every filter and conversion in [`imaging`](super)
//! consumes or borrows a buffer and returns a new one of the same dimensions.
//! Storage is an [`image::RgbaImage`], so the `pixels.len() == width * height`
//! invariant is enforced by construction.

use image::{DynamicImage, Rgba, RgbaImage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Build a buffer by evaluating `f` for every `(x, y)`.
    pub fn from_fn(width: u32, height: u32, f: impl FnMut(u32, u32) -> Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_fn(width, height, f),
        }
    }

    /// Build a buffer from row-major pixels.
    ///
    /// Returns `None` when `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Rgba<u8>]) -> Option<Self> {
        if pixels.len() as u64 != width as u64 * height as u64 {
            return None;
        }
        let raw: Vec<u8> = pixels.iter().flat_map(|p| p.0).collect();
        RgbaImage::from_raw(width, height, raw).map(|image| Self { image })
    }

    /// A buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, pixel: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, pixel),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `true` when the buffer has no pixels (either dimension is zero).
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like `image::ImageBuffer`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Row-major iterator over all pixels.
    pub fn pixels(&self) -> impl Iterator<Item = &Rgba<u8>> {
        self.image.pixels()
    }

    /// `true` if any pixel is not fully opaque.
    pub fn has_translucency(&self) -> bool {
        self.image.pixels().any(|p| p.0[3] != u8::MAX)
    }

    /// Apply `f` to every pixel, producing a new buffer of the same size.
    pub fn map_pixels(&self, mut f: impl FnMut(Rgba<u8>) -> Rgba<u8>) -> Self {
        let (w, h) = self.image.dimensions();
        Self::from_fn(w, h, |x, y| f(*self.image.get_pixel(x, y)))
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl From<DynamicImage> for PixelBuffer {
    fn from(image: DynamicImage) -> Self {
        Self {
            image: image.into_rgba8(),
        }
    }
}

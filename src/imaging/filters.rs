//! Pixel filters: grayscale, sepia, box blur and arbitrary convolution.
//!
//! Every filter borrows a [`PixelBuffer`] and returns a new one of the same
//! dimensions. No filter mutates its input or holds state between calls.
//!
//! | Filter | Alpha |
//! |---|---|
//! | [`grayscale`] | preserved |
//! | [`sepia`] | preserved |
//! | [`blur`] | convolved with color |
//! | [`convolve`] | convolved with color |
//!
//! ## Edges
//!
//! Convolution uses a no-op edge policy: a pixel whose full neighborhood does
//! not fit inside the image is copied from the source unchanged. There is no
//! zero padding and no partial kernel.

use super::buffer::PixelBuffer;
use super::calculations::{clamp_channel, kernel_reach, luma, neighborhood_fits, sepia_tone};
use super::kernel::Kernel;
use image::Rgba;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("Invalid kernel: {0} weights is not a perfect square")]
    InvalidKernel(usize),
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}

fn require_pixels(buffer: &PixelBuffer) -> Result<(), FilterError> {
    if buffer.is_empty() {
        return Err(FilterError::InvalidInput("image has no pixels"));
    }
    Ok(())
}

/// Convert to gray using [`luma`], replicated into R, G and B.
pub fn grayscale(buffer: &PixelBuffer) -> Result<PixelBuffer, FilterError> {
    require_pixels(buffer)?;
    Ok(buffer.map_pixels(|Rgba([r, g, b, a])| {
        let y = luma(r, g, b);
        Rgba([y, y, y, a])
    }))
}

/// Apply the sepia tone matrix, saturating at 255.
pub fn sepia(buffer: &PixelBuffer) -> Result<PixelBuffer, FilterError> {
    require_pixels(buffer)?;
    Ok(buffer.map_pixels(|Rgba([r, g, b, a])| {
        let (r, g, b) = sepia_tone(r, g, b);
        Rgba([r, g, b, a])
    }))
}

/// 3×3 box blur.
pub fn blur(buffer: &PixelBuffer) -> Result<PixelBuffer, FilterError> {
    convolve(buffer, &Kernel::box_blur())
}

/// Convolve every channel, alpha included, with `kernel`.
///
/// Output channel at `(x, y)` is
/// `Σ kernel[i][j] * source(x + j - n/2, y + i - n/2)` rounded and clamped to
/// `[0, 255]`. Pixels whose neighborhood leaves the image are copied as-is.
pub fn convolve(buffer: &PixelBuffer, kernel: &Kernel) -> Result<PixelBuffer, FilterError> {
    require_pixels(buffer)?;
    let n = kernel.size();
    if n == 0 || kernel.weights().len() != n * n {
        return Err(FilterError::InvalidKernel(kernel.weights().len()));
    }

    let (width, height) = (buffer.width(), buffer.height());
    let (before, _) = kernel_reach(n);

    Ok(PixelBuffer::from_fn(width, height, |x, y| {
        if !neighborhood_fits(x, y, width, height, n) {
            return buffer.pixel(x, y);
        }
        let mut acc = [0f32; 4];
        for i in 0..n {
            let sy = y - before + i as u32;
            for j in 0..n {
                let sx = x - before + j as u32;
                let w = kernel.at(i, j);
                let src = buffer.pixel(sx, sy).0;
                for (sum, channel) in acc.iter_mut().zip(src) {
                    *sum += w * channel as f32;
                }
            }
        }
        Rgba(acc.map(clamp_channel))
    }))
}

/// One of the built-in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKind {
    Grayscale,
    Sepia,
    Blur,
}

impl FilterKind {
    pub const ALL: [FilterKind; 3] = [FilterKind::Grayscale, FilterKind::Sepia, FilterKind::Blur];

    pub fn apply(self, buffer: &PixelBuffer) -> Result<PixelBuffer, FilterError> {
        match self {
            FilterKind::Grayscale => grayscale(buffer),
            FilterKind::Sepia => sepia(buffer),
            FilterKind::Blur => blur(buffer),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Blur => "blur",
        })
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" | "gray" | "grey" => Ok(FilterKind::Grayscale),
            "sepia" => Ok(FilterKind::Sepia),
            "blur" => Ok(FilterKind::Blur),
            _ => Err(FilterError::UnknownFilter(s.to_string())),
        }
    }
}

/// A set of built-in filters, applied in the fixed order
/// grayscale → sepia → blur regardless of how the set was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub grayscale: bool,
    pub sepia: bool,
    pub blur: bool,
}

impl FilterSet {
    pub fn contains(&self, kind: FilterKind) -> bool {
        match kind {
            FilterKind::Grayscale => self.grayscale,
            FilterKind::Sepia => self.sepia,
            FilterKind::Blur => self.blur,
        }
    }

    pub fn insert(&mut self, kind: FilterKind) {
        match kind {
            FilterKind::Grayscale => self.grayscale = true,
            FilterKind::Sepia => self.sepia = true,
            FilterKind::Blur => self.blur = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.grayscale || self.sepia || self.blur)
    }

    /// Selected filters in application order.
    pub fn kinds(&self) -> impl Iterator<Item = FilterKind> + '_ {
        FilterKind::ALL.into_iter().filter(|k| self.contains(*k))
    }

    /// Run every selected filter in order. An empty set returns a copy.
    pub fn apply(&self, buffer: &PixelBuffer) -> Result<PixelBuffer, FilterError> {
        require_pixels(buffer)?;
        let mut current = buffer.clone();
        for kind in self.kinds() {
            current = kind.apply(&current)?;
        }
        Ok(current)
    }
}

impl FromIterator<FilterKind> for FilterSet {
    fn from_iter<I: IntoIterator<Item = FilterKind>>(iter: I) -> Self {
        let mut set = FilterSet::default();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

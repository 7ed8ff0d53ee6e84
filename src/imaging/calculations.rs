//! Pure per-pixel calculations.
//!
//! All functions here are pure and testable without any I/O or images.

use image::{Rgb, Rgba};

/// Perceptual luma of an RGB triple (ITU-R BT.601 weights).
///
/// Integer arithmetic, so a neutral gray maps to itself exactly:
/// `luma(v, v, v) == v` for every `v`.
///
/// ```
/// # use simple_darkroom::imaging::calculations::luma;
/// assert_eq!(luma(255, 255, 255), 255);
/// assert_eq!(luma(0, 0, 0), 0);
/// assert_eq!(luma(255, 0, 0), 76);
/// ```
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((sum + 500) / 1000) as u8
}

/// Sepia tone matrix, one row per output channel.
pub const SEPIA: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Apply the [`SEPIA`] matrix to an RGB triple.
///
/// Each output is truncated toward zero and saturates at 255.
pub fn sepia_tone(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let src = [r as f64, g as f64, b as f64];
    let channel = |row: &[f64; 3]| {
        let v = row[0] * src[0] + row[1] * src[1] + row[2] * src[2];
        v.min(255.0) as u8
    };
    (channel(&SEPIA[0]), channel(&SEPIA[1]), channel(&SEPIA[2]))
}

/// Round a convolution sum to the nearest channel value, clamped to `[0, 255]`.
pub fn clamp_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Composite `src` over an opaque background ("source-over"), dropping alpha.
///
/// Alpha 255 yields `src`'s color, alpha 0 yields `background`.
pub fn composite_over(src: Rgba<u8>, background: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b, a] = src.0;
    let a = a as u32;
    let blend = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
    Rgb([
        blend(r, background.0[0]),
        blend(g, background.0[1]),
        blend(b, background.0[2]),
    ])
}

/// Offsets from the kernel center for an `n`-wide kernel: `(before, after)`.
///
/// Cell `j` of the kernel samples `x + j - n / 2`, so the neighborhood spans
/// `n / 2` pixels before the center and `n - 1 - n / 2` after it.
pub fn kernel_reach(n: usize) -> (u32, u32) {
    let before = n / 2;
    let after = n - 1 - before;
    (before as u32, after as u32)
}

/// Whether the full `n`×`n` neighborhood centered at `(x, y)` is inside a
/// `width`×`height` image.
pub fn neighborhood_fits(x: u32, y: u32, width: u32, height: u32, n: usize) -> bool {
    let (before, after) = kernel_reach(n);
    x >= before
        && y >= before
        && (x as u64 + after as u64) < width as u64
        && (y as u64 + after as u64) < height as u64
}

//! # Simple Darkroom
//!
//! Batch image filters, custom convolution kernels and format conversion.
//! Load a set of images, pick an operation, choose a destination, and every
//! image is processed independently: one bad file never stops the rest.
//!
//! # Architecture: Records → Batch → Report
//!
//! ```text
//! 1. Load      files     →  ImageRecord      (decode once, remember format + size)
//! 2. Select    records   →  Selection        (insertion-ordered, no duplicates)
//! 3. Batch     selection →  outputs on disk  (rayon, one unit per item or item × format)
//! 4. Report    outcomes  →  BatchReport      (success count + ordered failures)
//! ```
//!
//! Pixel work happens on [`imaging::PixelBuffer`] values that are never
//! mutated in place: every filter returns a new buffer. That keeps batch
//! workers free of shared state, so they run in parallel with no locks.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel buffers, filters, kernels, alpha flattening, the codec trait and its `image`-crate backend |
//! | [`record`] | Loaded images: source path, decoded buffer, format, size on disk |
//! | [`selection`] | Which records an operation runs over, in selection order |
//! | [`naming`] | `<base>_<suffix>.<ext>` output names |
//! | [`batch`] | Batch orchestration, per-unit failures, progress events, cancellation |
//! | [`metadata`] | Best-effort EXIF camera model and GPS location |
//! | [`config`] | `darkroom.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Edge Pixels Are Copied, Not Padded
//!
//! Convolution only writes pixels whose whole neighbourhood lies inside the
//! image. Border pixels keep their source value. Zero padding would darken
//! the border of every blurred image; clamped sampling would smear it.
//!
//! ## Conversion Re-reads the Source
//!
//! Filters run on the buffer decoded at load time, but conversion decodes the
//! file again. A file that disappeared or was overwritten with garbage after
//! loading therefore fails on its own conversion units instead of silently
//! re-encoding stale pixels.
//!
//! ## Atomic Writes
//!
//! Every output is written to a hidden `.name.partial` sibling and renamed into
//! place. A failed or interrupted unit never leaves a truncated image under
//! its final name.
//!
//! ## Logging Is Optional
//!
//! The library only emits `tracing` events and, when asked, sends
//! [`batch::BatchEvent`]s down a channel. Nothing is printed unless the caller
//! installs a subscriber or listens on the channel.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod record;
pub mod selection;

#[cfg(test)]
pub(crate) mod test_helpers;

//! Shared test utilities for the simple-darkroom test suite.
//!
//! Provides synthetic pixel buffers, on-disk fixture writers, and record
//! builders so module tests don't each reinvent them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let records = write_records(tmp.path(), &["a.png", "b.png"]);
//! let report = run_batch(&records, ...).unwrap();
//! let failure = find_failure(&report, "b.png");
//! ```

use std::path::{Path, PathBuf};

use image::Rgba;

use crate::batch::{BatchReport, Failure};
use crate::imaging::{ImageCodec, PixelBuffer, RustBackend, TargetFormat};
use crate::record::ImageRecord;

// =========================================================================
// Synthetic buffers
// =========================================================================

/// Opaque buffer with distinct RGB per pixel.
pub fn gradient_buffer(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        Rgba([
            (x * 37 % 256) as u8,
            (y * 53 % 256) as u8,
            ((x + y) * 19 % 256) as u8,
            255,
        ])
    })
}

/// Buffer whose alpha varies across pixels, including fully transparent ones.
pub fn translucent_buffer(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let alpha = match (x + y) % 3 {
            0 => 0,
            1 => 128,
            _ => 255,
        };
        Rgba([(x * 40 % 256) as u8, 200, (y * 60 % 256) as u8, alpha])
    })
}

// =========================================================================
// Fixture files
// =========================================================================

/// Encode `buffer` as PNG at `path`. Panics on failure.
pub fn write_png(path: &Path, buffer: &PixelBuffer) {
    RustBackend::new()
        .encode(buffer, TargetFormat::Png, path)
        .unwrap_or_else(|e| panic!("failed to write fixture {}: {e}", path.display()));
}

/// Write one gradient PNG per name under `dir` and load each as a record.
pub fn write_records(dir: &Path, names: &[&str]) -> Vec<ImageRecord> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let path = dir.join(name);
            write_png(&path, &gradient_buffer(4 + i as u32, 3));
            ImageRecord::load(&RustBackend::new(), &path)
                .unwrap_or_else(|e| panic!("failed to load fixture {name}: {e}"))
        })
        .collect()
}

/// Files in `dir`, sorted by name.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Path to `name` under `dir`, asserting it exists.
pub fn expect_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    assert!(
        path.is_file(),
        "expected {name} in {}. Found: {:?}",
        dir.display(),
        file_names(dir)
    );
    path
}

// =========================================================================
// Report lookups: panic with a clear message on miss
// =========================================================================

/// Find the failure recorded for `item`. Panics if not found.
pub fn find_failure<'a>(report: &'a BatchReport, item: &str) -> &'a Failure {
    report
        .failures
        .iter()
        .find(|f| f.item == item)
        .unwrap_or_else(|| {
            let items: Vec<&str> = report.failures.iter().map(|f| f.item.as_str()).collect();
            panic!("failure '{item}' not found. Available: {items:?}")
        })
}

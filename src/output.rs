//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every image is shown by its positional index and file name, with paths and
//! details as indented context lines underneath. Batch progress uses the same
//! index, so a failure line can be traced back to its unit.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! 001 sunset.jpg
//!     Source: shots/sunset.jpg
//!     Format: JPEG
//!     Image Size: 4000 x 3000 px
//!     File Size: 2841 KB
//!     Camera Model: X100V
//!     Location: Latitude: 48.858370, Longitude: 2.294481
//! ```
//!
//! ## Batch
//!
//! ```text
//! convert to PNG, JPEG (4 units) → out
//!     001 one.png to PNG → one_converted.png
//!     004 two.png to JPEG: failed
//!         Failed to decode shots/two.png: ...
//!
//! Succeeded: 3
//! Failed:
//! - two.png to JPEG: Failed to decode shots/two.png: ...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::batch::{BatchEvent, BatchReport};
use crate::metadata::CameraMetadata;
use crate::record::ImageRecord;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Loading and selection
// ============================================================================

/// `Selected N images.`
pub fn format_selection_summary(count: usize) -> Vec<String> {
    vec![format!("Selected {}.", plural(count, "image", "images"))]
}

pub fn format_load_failure(path: &Path, reason: &str) -> Vec<String> {
    vec![
        format!("Unable to load {}", file_label(path)),
        format!("{}{}", indent(1), reason),
    ]
}

pub fn print_selection_summary(count: usize) {
    for line in format_selection_summary(count) {
        println!("{}", line);
    }
}

pub fn print_load_failure(path: &Path, reason: &str) {
    for line in format_load_failure(path, reason) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Image info
// ============================================================================

/// Format one image's properties.
pub fn format_record_info(
    index: usize,
    record: &ImageRecord,
    metadata: &CameraMetadata,
) -> Vec<String> {
    let context = indent(1);
    vec![
        format!("{} {}", format_index(index), record.file_name()),
        format!("{context}Source: {}", record.source_path().display()),
        format!("{context}Format: {}", record.format()),
        format!(
            "{context}Image Size: {} x {} px",
            record.width(),
            record.height()
        ),
        format!("{context}File Size: {} KB", record.file_size_kb()),
        format!("{context}Camera Model: {}", metadata.camera_model),
        format!("{context}Location: {}", metadata.location),
    ]
}

pub fn print_record_info(index: usize, record: &ImageRecord, metadata: &CameraMetadata) {
    for line in format_record_info(index, record, metadata) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started {
            operation,
            unit_count,
            destination,
        } => vec![format!(
            "{} ({}) → {}",
            operation,
            plural(*unit_count, "unit", "units"),
            destination.display()
        )],
        BatchEvent::UnitWritten {
            index,
            item,
            output,
        } => vec![format!(
            "{}{} {} → {}",
            indent(1),
            format_index(index + 1),
            item,
            file_label(output)
        )],
        BatchEvent::UnitFailed {
            index,
            item,
            reason,
        } => vec![
            format!("{}{} {}: failed", indent(1), format_index(index + 1), item),
            format!("{}{}", indent(2), reason),
        ],
    }
}

/// Format the end-of-batch summary.
///
/// Always states the success count; failures and skipped units only appear
/// when there are any.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!("Succeeded: {}", report.success_count)];
    if !report.failures.is_empty() {
        lines.push("Failed:".to_string());
        for failure in &report.failures {
            lines.push(format!("- {}: {}", failure.item, failure.reason));
        }
    }
    if report.skipped > 0 {
        lines.push(format!("Skipped (cancelled): {}", report.skipped));
    }
    lines
}

pub fn format_cancelled() -> Vec<String> {
    vec!["Cancelled".to_string()]
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

pub fn print_cancelled() {
    for line in format_cancelled() {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Failure;
    use crate::imaging::SourceFormat;
    use crate::metadata::NOT_AVAILABLE;
    use crate::test_helpers::gradient_buffer;
    use std::path::PathBuf;

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn selection_summary_pluralizes() {
        assert_eq!(format_selection_summary(1), vec!["Selected 1 image."]);
        assert_eq!(format_selection_summary(3), vec!["Selected 3 images."]);
    }

    #[test]
    fn load_failure_names_file() {
        let lines = format_load_failure(Path::new("/shots/x.png"), "Not a file: /shots/x.png");
        assert_eq!(lines[0], "Unable to load x.png");
        assert_eq!(lines[1], "    Not a file: /shots/x.png");
    }

    // =========================================================================
    // Info
    // =========================================================================

    #[test]
    fn record_info_lines() {
        let record = ImageRecord::new(
            "shots/sunset.jpg",
            gradient_buffer(40, 30),
            SourceFormat::Jpeg,
            12,
        );
        let metadata = CameraMetadata {
            camera_model: "X100V".to_string(),
            location: NOT_AVAILABLE.to_string(),
        };
        let lines = format_record_info(2, &record, &metadata);
        assert_eq!(
            lines,
            vec![
                "002 sunset.jpg",
                "    Source: shots/sunset.jpg",
                "    Format: JPEG",
                "    Image Size: 40 x 30 px",
                "    File Size: 12 KB",
                "    Camera Model: X100V",
                "    Location: N/A",
            ]
        );
    }

    #[test]
    fn record_info_unknown_format() {
        let record = ImageRecord::new("a.tiff", gradient_buffer(1, 1), SourceFormat::Unknown, 0);
        let lines = format_record_info(1, &record, &CameraMetadata::default());
        assert_eq!(lines[2], "    Format: UNKNOWN");
    }

    // =========================================================================
    // Batch events and summary
    // =========================================================================

    #[test]
    fn batch_started() {
        let event = BatchEvent::Started {
            operation: "download".to_string(),
            unit_count: 1,
            destination: PathBuf::from("out"),
        };
        assert_eq!(format_batch_event(&event), vec!["download (1 unit) → out"]);
    }

    #[test]
    fn batch_unit_written_uses_one_based_index() {
        let event = BatchEvent::UnitWritten {
            index: 0,
            item: "one.png to PNG".to_string(),
            output: PathBuf::from("/out/one_converted.png"),
        };
        assert_eq!(
            format_batch_event(&event),
            vec!["    001 one.png to PNG → one_converted.png"]
        );
    }

    #[test]
    fn batch_unit_failed_shows_reason() {
        let event = BatchEvent::UnitFailed {
            index: 3,
            item: "two.png".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(
            format_batch_event(&event),
            vec!["    004 two.png: failed", "        boom"]
        );
    }

    #[test]
    fn summary_clean() {
        let report = BatchReport {
            success_count: 3,
            ..Default::default()
        };
        assert_eq!(format_batch_summary(&report), vec!["Succeeded: 3"]);
    }

    #[test]
    fn summary_lists_failures_in_order_and_skips() {
        let report = BatchReport {
            success_count: 1,
            failures: vec![
                Failure {
                    item: "a.png to JPEG".to_string(),
                    reason: "bad".to_string(),
                },
                Failure {
                    item: "b.png to JPEG".to_string(),
                    reason: "worse".to_string(),
                },
            ],
            skipped: 2,
            outputs: vec![],
        };
        assert_eq!(
            format_batch_summary(&report),
            vec![
                "Succeeded: 1",
                "Failed:",
                "- a.png to JPEG: bad",
                "- b.png to JPEG: worse",
                "Skipped (cancelled): 2",
            ]
        );
    }

    #[test]
    fn cancelled_line() {
        assert_eq!(format_cancelled(), vec!["Cancelled"]);
    }
}

//! Output file naming.
//!
//! Every batch output is named `<base>_<suffix>.<ext>`:
//!
//! - `base` is the source file name with its final extension removed;
//! - `suffix` names the operation (`converted`, `filtered`, `custom_filtered`,
//!   `downloaded`);
//! - `ext` is the lowercase extension of the written format.
//!
//! Examples:
//! - `photo.png` + `filtered` + `png` → `photo_filtered.png`
//! - `archive.tar.gz` + `downloaded` + `gz` → `archive.tar_downloaded.gz`
//! - `README` + `converted` + `png` → `README_converted.png`
//!
//! Names are unique per (source, suffix, extension), which is what lets
//! parallel workers write into one directory without coordination.

/// Strip the final extension from a file name.
///
/// Names with no dot, a leading dot only (`.hidden`), or a trailing dot
/// (`name.`) are returned whole.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 && dot < file_name.len() - 1 => &file_name[..dot],
        _ => file_name,
    }
}

/// Build `<base>_<suffix>.<ext>` with `ext` lowercased.
pub fn output_name(source_file_name: &str, suffix: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        base_name(source_file_name),
        suffix,
        extension.to_lowercase()
    )
}

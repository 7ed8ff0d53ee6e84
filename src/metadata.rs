//! Best-effort EXIF metadata: camera model and GPS location.
//!
//! Read with `kamadak-exif`. Failures never propagate: a missing file, a
//! format without EXIF, or a malformed block all yield [`NOT_AVAILABLE`] for
//! the affected field.
//!
//! ## Location format
//!
//! ```text
//! Latitude: 48.858370, Longitude: 2.294481
//! ```
//!
//! A position of exactly `(0, 0)` is treated as unset, since cameras without a
//! fix commonly write zeros.

use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Sentinel for fields that could not be read.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct CameraMetadata {
    pub camera_model: String,
    pub location: String,
}

impl Default for CameraMetadata {
    fn default() -> Self {
        Self {
            camera_model: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Return the first non-empty value, trimmed.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Read camera model and location from `path`, falling back to `N/A`.
pub fn read(path: &Path) -> CameraMetadata {
    let Some(exif) = read_exif(path) else {
        return CameraMetadata::default();
    };

    let model = string_field(&exif, Tag::Model);
    let camera_model = resolve(&[model.as_deref()]).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let location = match (
        gps_coord(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef),
        gps_coord(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef),
    ) {
        (Some(lat), Some(lon)) => format_location(lat, lon),
        _ => NOT_AVAILABLE.to_string(),
    };

    CameraMetadata {
        camera_model,
        location,
    }
}

/// `Latitude: x, Longitude: y` with six decimals, or `N/A` for `(0, 0)`.
pub fn format_location(latitude: f64, longitude: f64) -> String {
    if latitude == 0.0 && longitude == 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    format!("Latitude: {latitude:.6}, Longitude: {longitude:.6}")
}

fn read_exif(path: &Path) -> Option<exif::Exif> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    Reader::new().read_from_container(&mut reader).ok()
}

fn string_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY).map(|f| {
        let s = f.display_value().to_string();
        s.trim_matches('"').to_string()
    })
}

/// Degrees/minutes/seconds plus N/S/E/W reference → signed decimal degrees.
fn gps_coord(exif: &exif::Exif, coord_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let coord = exif.get_field(coord_tag, In::PRIMARY)?;
    let reference = exif.get_field(ref_tag, In::PRIMARY)?;

    let degrees = dms_to_decimal(&coord.value)?;
    let reference = reference.display_value().to_string();
    let sign = if reference.contains('S') || reference.contains('W') {
        -1.0
    } else {
        1.0
    };
    Some(sign * degrees)
}

fn dms_to_decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(r) if r.len() >= 3 => {
            Some(r[0].to_f64() + r[1].to_f64() / 60.0 + r[2].to_f64() / 3600.0)
        }
        _ => None,
    }
}

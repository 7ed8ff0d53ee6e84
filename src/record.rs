//! Loaded images.
//!
//! An [`ImageRecord`] ties a source path to its decoded [`PixelBuffer`], its
//! detected [`SourceFormat`] and its size on disk. Records are built once when
//! an image is loaded and never change afterwards; removing an image from the
//! working set simply drops its record.

use crate::imaging::{CodecError, ImageCodec, PixelBuffer, SourceFormat};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Image file does not exist: {0}")]
    Missing(PathBuf),
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    source_path: PathBuf,
    buffer: PixelBuffer,
    format: SourceFormat,
    file_size_kb: u64,
}

impl ImageRecord {
    /// Assemble a record from already-decoded parts.
    pub fn new(
        source_path: impl Into<PathBuf>,
        buffer: PixelBuffer,
        format: SourceFormat,
        file_size_kb: u64,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            buffer,
            format,
            file_size_kb,
        }
    }

    /// Validate `path`, decode it with `codec`, and record its size and format.
    pub fn load(codec: &impl ImageCodec, path: &Path) -> Result<Self, RecordError> {
        let meta = std::fs::metadata(path).map_err(|_| RecordError::Missing(path.to_path_buf()))?;
        if !meta.is_file() {
            return Err(RecordError::NotAFile(path.to_path_buf()));
        }
        let buffer = codec.decode(path)?;
        Ok(Self {
            source_path: path.to_path_buf(),
            buffer,
            format: SourceFormat::from_path(path),
            file_size_kb: meta.len() / 1024,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn file_size_kb(&self) -> u64 {
        self.file_size_kb
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Final path component, used as the record's display identity.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }

    /// Lowercase source extension, used when writing in the source's own format.
    ///
    /// `None` when the format is unknown.
    pub fn output_extension(&self) -> Option<String> {
        if self.format == SourceFormat::Unknown {
            return None;
        }
        self.source_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}

/// Load every path, keeping going past failures.
///
/// Returns loaded records in input order and the per-path errors.
pub fn load_all(
    codec: &impl ImageCodec,
    paths: &[PathBuf],
) -> (Vec<ImageRecord>, Vec<(PathBuf, RecordError)>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match ImageRecord::load(codec, path) {
            Ok(r) => records.push(r),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unable to load image");
                errors.push((path.clone(), e));
            }
        }
    }
    (records, errors)
}

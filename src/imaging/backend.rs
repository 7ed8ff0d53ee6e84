//! Codec trait and shared error type.
//!
//! The [`ImageCodec`] trait is the boundary to byte-level decoding and
//! encoding. Everything above it (filters, conversion, batch orchestration)
//! works on [`PixelBuffer`]s and never touches file formats directly.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording mock in [`tests`].

use super::buffer::PixelBuffer;
use super::convert::TargetFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
}

impl CodecError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        CodecError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Decoder + encoder collaborator.
///
/// `Sync` so a single codec can be shared across rayon workers.
pub trait ImageCodec: Sync {
    /// Read and decode `path` into an RGBA buffer.
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError>;

    /// Encode `buffer` as `format` and write it to `path`.
    ///
    /// Implementations must not leave a truncated file at `path` on failure;
    /// see [`write_atomically`].
    fn encode(
        &self,
        buffer: &PixelBuffer,
        format: TargetFormat,
        path: &Path,
    ) -> Result<(), CodecError>;
}

/// Run `write` against a hidden sibling of `path`, then rename it into place.
///
/// On any failure the partial file is removed, so `path` either holds a
/// complete file or is left as it was.
pub fn write_atomically(
    path: &Path,
    write: impl FnOnce(&Path) -> Result<(), CodecError>,
) -> Result<(), CodecError> {
    let partial = partial_path(path);
    let result = write(&partial).and_then(|()| {
        std::fs::rename(&partial, path).map_err(|e| CodecError::io(path, e))
    });
    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}

/// `dir/.name.partial` for `dir/name`.
pub(crate) fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the whole contract between the editor and
//! whatever does pixel work: read an image's dimensions, and apply one
//! [`FilterKind`](crate::catalog::FilterKind) from a source file to an output
//! file.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the recording
//! mock in this module's `tests` submodule.

use super::params::FilterRequest;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures inside the backend. Kept apart from catalog and record
/// validation errors so callers can tell "bad input" from "processing broke".
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can be shared across rayon workers in batch mode.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read `request.source`, apply `request.kind`, write `request.output`.
    fn apply(&self, request: &FilterRequest) -> Result<(), BackendError>;
}

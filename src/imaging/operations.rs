//! High-level filter operations.
//!
//! These functions decide where a filtered image goes, build the
//! [`FilterRequest`], and hand it to the backend. They are the
//! `(backend key, source path) -> result path` contract the rest of the crate
//! relies on.

use super::backend::{BackendError, ImageBackend};
use super::params::{FilterParams, FilterRequest};
use crate::catalog::FilterKind;
use crate::naming;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Plan a session filter application without executing it.
///
/// The output lands in `output_dir` as `output_{millis}_{key}.{ext}`.
pub fn plan_filter(
    kind: FilterKind,
    source: &Path,
    output_dir: &Path,
    ext: &str,
    created_at: DateTime<Utc>,
    params: &FilterParams,
) -> FilterRequest {
    FilterRequest {
        kind,
        source: source.to_path_buf(),
        output: output_dir.join(naming::output_file_name(created_at, kind, ext)),
        params: *params,
    }
}

/// Apply `kind` to `source`, writing into `output_dir`, and return the
/// written path.
///
/// Creates `output_dir` if needed. Fails with
/// [`BackendError::SourceNotFound`] before touching the backend when the
/// source is missing.
pub fn apply_filter(
    backend: &impl ImageBackend,
    kind: FilterKind,
    source: &Path,
    output_dir: &Path,
    ext: &str,
    created_at: DateTime<Utc>,
    params: &FilterParams,
) -> Result<PathBuf> {
    if !source.is_file() {
        return Err(BackendError::SourceNotFound(source.to_path_buf()));
    }
    std::fs::create_dir_all(output_dir)?;

    let request = plan_filter(kind, source, output_dir, ext, created_at, params);
    backend.apply(&request)?;
    Ok(request.output)
}

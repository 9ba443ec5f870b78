//! Apply one filter to every image under a directory.
//!
//! Images are discovered with [`collect_images`] and filtered in parallel
//! using [rayon](https://docs.rs/rayon). The relative directory structure of
//! the input is mirrored under the output directory:
//!
//! ```text
//! photos/                       out/
//! ├── beach.jpg         ──▶     ├── beach-sepia.jpg
//! └── 2024/                     └── 2024/
//!     └── dog.png       ──▶         └── dog-sepia.png
//! ```
//!
//! A failed image is reported as [`BatchEvent::Failed`] and counted; it does
//! not stop the rest of the batch. When two sources map to the same output
//! (`a.jpg` and `a.png` with `format = "jpg"`), the first in sorted order is
//! written and the others fail without touching the file.

use crate::catalog::{CatalogError, FilterCatalog, FilterKind};
use crate::config::OutputFormat;
use crate::imaging::{BackendError, FilterParams, FilterRequest, ImageBackend};
use crate::naming;
use rayon::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a batch reads from, where it writes to, and how.
#[derive(Debug, Clone)]
pub struct BatchJob<'a> {
    pub input_dir: &'a Path,
    pub output_dir: &'a Path,
    pub params: FilterParams,
    pub format: OutputFormat,
}

/// Progress reported while a batch runs. `index` is 1-based within the
/// sorted input list; events may arrive out of order.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Applied {
        index: usize,
        total: usize,
        source: PathBuf,
        output: PathBuf,
    },
    Failed {
        index: usize,
        total: usize,
        source: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub applied: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.applied + self.failed
    }
}

/// All supported images under `dir`, sorted by path.
///
/// Files this crate generated itself (session outputs, exports) are skipped.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::InputNotFound(dir.to_path_buf()));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| naming::is_supported_image(path))
        .filter(|path| {
            path.file_name()
                .map(|n| !naming::is_generated_name(&n.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();

    images.sort();
    Ok(images)
}

/// Output path for `source`, mirroring its location relative to `input_dir`.
pub fn batch_output_path(source: &Path, kind: FilterKind, job: &BatchJob<'_>) -> PathBuf {
    let relative_dir = source
        .parent()
        .and_then(|p| p.strip_prefix(job.input_dir).ok())
        .unwrap_or(Path::new(""));
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let ext = job.format.extension_for(source);

    job.output_dir
        .join(relative_dir)
        .join(naming::batch_file_name(&stem, kind, &ext))
}

/// Where one image's output goes.
#[derive(Debug, Clone, PartialEq)]
enum Target {
    Write(PathBuf),
    /// Another source earlier in the batch already claimed `output`.
    Taken { output: PathBuf, by: PathBuf },
}

/// Plan every output before any work starts. The first source to claim an
/// output path keeps it.
fn plan_targets(images: &[PathBuf], kind: FilterKind, job: &BatchJob<'_>) -> Vec<Target> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    images
        .iter()
        .map(|source| {
            let output = batch_output_path(source, kind, job);
            match claimed.entry(output.clone()) {
                Entry::Occupied(e) => Target::Taken {
                    output,
                    by: e.get().to_path_buf(),
                },
                Entry::Vacant(e) => {
                    e.insert(source);
                    Target::Write(output)
                }
            }
        })
        .collect()
}

/// True if `path`, found by walking `job.input_dir`, lies under the output
/// directory. Both roots must already be canonical.
fn is_under_output(
    path: &Path,
    job: &BatchJob<'_>,
    input_root: &Path,
    output_root: &Path,
) -> bool {
    path.strip_prefix(job.input_dir)
        .map(|rel| input_root.join(rel).starts_with(output_root))
        .unwrap_or(false)
}

fn write_target(
    backend: &impl ImageBackend,
    kind: FilterKind,
    source: &Path,
    output: &Path,
    params: FilterParams,
) -> Result<(), BackendError> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    backend.apply(&FilterRequest {
        kind,
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        params,
    })
}

/// Apply the filter with backend key `key` to every image under
/// `job.input_dir`.
///
/// The key is resolved before any work starts, so an unknown key fails
/// without touching the filesystem. Images already inside `job.output_dir`
/// are left out so that re-running into a nested output directory does not
/// filter its own results; the check compares canonical paths, so `.` and
/// `out` work as well as absolute ones.
pub fn run_batch(
    backend: &impl ImageBackend,
    catalog: &FilterCatalog,
    key: &str,
    job: &BatchJob<'_>,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let kind = catalog.find_by_key(key)?.kind();
    let found = collect_images(job.input_dir)?;

    std::fs::create_dir_all(job.output_dir)?;
    let input_root = std::fs::canonicalize(job.input_dir)?;
    let output_root = std::fs::canonicalize(job.output_dir)?;

    let images: Vec<PathBuf> = found
        .into_iter()
        .filter(|p| !is_under_output(p, job, &input_root, &output_root))
        .collect();
    let targets = plan_targets(&images, kind, job);
    let total = images.len();
    log::info!(
        "batch {}: {} images from {}",
        kind,
        total,
        job.input_dir.display()
    );

    let results: Vec<bool> = images
        .par_iter()
        .zip(targets.par_iter())
        .enumerate()
        .map(|(i, (source, target))| {
            let index = i + 1;
            let result = match target {
                Target::Write(output) => write_target(backend, kind, source, output, job.params)
                    .map(|()| output.clone())
                    .map_err(|e| e.to_string()),
                Target::Taken { output, by } => Err(format!(
                    "{} is already written from {}",
                    output.display(),
                    by.display()
                )),
            };

            let (ok, event) = match result {
                Ok(output) => (
                    true,
                    BatchEvent::Applied {
                        index,
                        total,
                        source: source.clone(),
                        output,
                    },
                ),
                Err(reason) => {
                    log::warn!("{}: {reason}", source.display());
                    (
                        false,
                        BatchEvent::Failed {
                            index,
                            total,
                            source: source.clone(),
                            reason,
                        },
                    )
                }
            };
            if let Some(tx) = &events {
                // A dropped receiver only means nobody is listening.
                let _ = tx.send(event);
            }
            ok
        })
        .collect();

    let applied = results.iter().filter(|ok| **ok).count();
    let summary = BatchSummary {
        applied,
        failed: total - applied,
    };
    log::info!(
        "batch {} done: {} applied, {} failed",
        kind,
        summary.applied,
        summary.failed
    );
    Ok(summary)
}

//! Edit sessions: one selected image and the stack of filters applied to it.
//!
//! The history is a stack of [`ImageRecord`]s. The bottom entry is always
//! the original selection; every successful [`EditSession::apply`] pushes a
//! new record whose local path is the backend's output. The input to each
//! filter is the newest record, so filters compose.
//!
//! ```text
//! select(cat.jpg)      [Original]
//! apply("sepia")       [Original, Sepia]
//! apply("blur")        [Original, Sepia, Blur]
//! undo()               [Original, Sepia]
//! ```
//!
//! Records are never mutated. Undo drops the newest record but leaves its
//! output file on disk; the work directory is a scratch area.

use crate::catalog::{CatalogError, FilterCatalog};
use crate::config::OutputFormat;
use crate::imaging::{self, BackendError, FilterParams, ImageBackend};
use crate::naming;
use crate::record::{ImageRecord, RecordError, monotonic_now};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image selected")]
    Empty,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("Filter backend failed: {0}")]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An in-progress edit of one image.
pub struct EditSession<'c> {
    catalog: &'c FilterCatalog,
    work_dir: PathBuf,
    format: OutputFormat,
    params: FilterParams,
    history: Vec<ImageRecord<'c>>,
}

impl<'c> EditSession<'c> {
    /// Start a session with nothing selected. Filter outputs go to `work_dir`.
    pub fn new(catalog: &'c FilterCatalog, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            work_dir: work_dir.into(),
            format: OutputFormat::default(),
            params: FilterParams::default(),
            history: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_params(mut self, params: FilterParams) -> Self {
        self.params = params;
        self
    }

    /// Select a new source image, discarding any previous history.
    pub fn select(&mut self, path: impl Into<PathBuf>) -> Result<&ImageRecord<'c>, SessionError> {
        let path = path.into();
        let record = ImageRecord::original(path.clone())?;
        if !path.is_file() {
            return Err(BackendError::SourceNotFound(path).into());
        }
        log::info!("selected {}", path.display());
        self.history.clear();
        self.history.push(record);
        Ok(&self.history[0])
    }

    /// Apply the filter with backend key `key` to the current image.
    ///
    /// On success the new record becomes current. On failure the history is
    /// unchanged.
    pub fn apply(
        &mut self,
        backend: &impl ImageBackend,
        key: &str,
    ) -> Result<&ImageRecord<'c>, SessionError> {
        let filter = self.catalog.find_by_key(key)?;
        let source = self.current().ok_or(SessionError::Empty)?.local_path();

        let created_at = monotonic_now();
        let ext = self.format.extension_for(source);
        log::info!("applying {} to {}", filter.backend_key(), source.display());

        let output = imaging::apply_filter(
            backend,
            filter.kind(),
            source,
            &self.work_dir,
            &ext,
            created_at,
            &self.params,
        )
        .inspect_err(|e| log::warn!("{} failed: {e}", filter.backend_key()))?;

        let record = ImageRecord::filtered_at(output, filter, created_at)?;
        let index = self.history.len();
        self.history.push(record);
        Ok(&self.history[index])
    }

    /// Drop the newest filtered image. Returns false (and does nothing) if
    /// only the original, or nothing, is left.
    pub fn undo(&mut self) -> bool {
        if self.can_undo() {
            let dropped = self.history.pop();
            if let Some(record) = dropped {
                log::debug!("undo {}", record.local_path().display());
            }
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.len() > 1
    }

    /// The newest image, or `None` before anything is selected.
    pub fn current(&self) -> Option<&ImageRecord<'c>> {
        self.history.last()
    }

    /// Oldest first.
    pub fn history(&self) -> &[ImageRecord<'c>] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn catalog(&self) -> &'c FilterCatalog {
        self.catalog
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Copy the current image into `dest_dir` as `edited_{millis}.{ext}`.
    pub fn export(&self, dest_dir: &Path) -> Result<PathBuf, SessionError> {
        let current = self.current().ok_or(SessionError::Empty)?;
        std::fs::create_dir_all(dest_dir)?;

        let ext = naming::extension_or(current.local_path(), "png");
        let dest = dest_dir.join(naming::export_file_name(monotonic_now(), &ext));
        std::fs::copy(current.local_path(), &dest)?;
        log::info!("exported {}", dest.display());
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::create_test_png;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("cat.png");
        create_test_png(&source, 24, 16);
        (tmp, source)
    }

    #[test]
    fn new_session_is_empty() {
        let catalog = FilterCatalog::standard();
        let session = EditSession::new(&catalog, "/work");
        assert!(session.is_empty());
        assert!(session.current().is_none());
        assert!(!session.can_undo());
    }

    #[test]
    fn select_starts_history_with_original() {
        let (_tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let mut session = EditSession::new(&catalog, "/work");

        let record = session.select(&source).unwrap();
        assert!(record.is_original());
        assert_eq!(record.local_path(), source.as_path());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn select_missing_file_fails_and_keeps_history() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let mut session = EditSession::new(&catalog, tmp.path().join("work"));
        session.select(&source).unwrap();

        let err = session.select(tmp.path().join("nope.png")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Backend(BackendError::SourceNotFound(_))
        ));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn apply_without_selection_is_empty_error() {
        let catalog = FilterCatalog::standard();
        let mut session = EditSession::new(&catalog, "/work");
        let err = session.apply(&MockBackend::new(), "sepia").unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn apply_unknown_key_is_not_found() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let mut session = EditSession::new(&catalog, tmp.path().join("work"));
        session.select(&source).unwrap();

        let err = session.apply(&MockBackend::new(), "vintage").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Catalog(CatalogError::NotFound { .. })
        ));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn apply_chains_from_newest_record() {
        let (tmp, source) = fixture();
        let work = tmp.path().join("work");
        let catalog = FilterCatalog::standard();
        let backend = MockBackend::touching();
        let mut session = EditSession::new(&catalog, &work);
        session.select(&source).unwrap();

        let first = session.apply(&backend, "sepia").unwrap().local_path().to_path_buf();
        session.apply(&backend, "blur").unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[1],
            RecordedOp::Apply { kind: crate::catalog::FilterKind::Blur, source: s, .. }
                if *s == first.to_string_lossy()
        ));

        let labels: Vec<&str> = session.history().iter().map(|r| r.display_name()).collect();
        assert_eq!(labels, vec!["Original", "Edited image", "Edited image"]);
        assert_eq!(
            session.current().unwrap().applied_filter().unwrap().display_name(),
            "Blur"
        );
    }

    #[test]
    fn apply_records_reference_catalog_descriptors() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let backend = MockBackend::touching();
        let mut session = EditSession::new(&catalog, tmp.path().join("work"));
        session.select(&source).unwrap();

        let applied = session.apply(&backend, "sepia").unwrap().applied_filter().unwrap();
        assert!(std::ptr::eq(applied, catalog.find_by_key("sepia").unwrap()));
    }

    #[test]
    fn backend_failure_leaves_history_untouched() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let backend = MockBackend::new();
        backend.fail_on(&source);
        let mut session = EditSession::new(&catalog, tmp.path().join("work"));
        session.select(&source).unwrap();

        let err = session.apply(&backend, "invert").unwrap_err();
        assert!(matches!(err, SessionError::Backend(_)));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn output_extension_follows_format() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let backend = MockBackend::touching();
        let mut session =
            EditSession::new(&catalog, tmp.path().join("work")).with_format(OutputFormat::Jpg);
        session.select(&source).unwrap();

        let record = session.apply(&backend, "mirror").unwrap();
        let name = record.local_path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("output_"));
        assert!(name.ends_with("_mirror.jpg"));
    }

    #[test]
    fn undo_pops_until_original() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let backend = MockBackend::touching();
        let mut session = EditSession::new(&catalog, tmp.path().join("work"));
        session.select(&source).unwrap();
        session.apply(&backend, "grayscale").unwrap();
        session.apply(&backend, "invert").unwrap();

        assert!(session.undo());
        assert_eq!(
            session.current().unwrap().applied_filter().unwrap().backend_key(),
            "grayscale"
        );
        assert!(session.undo());
        assert!(session.current().unwrap().is_original());
        assert!(!session.undo());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn undo_on_empty_session_is_noop() {
        let catalog = FilterCatalog::standard();
        let mut session = EditSession::new(&catalog, "/work");
        assert!(!session.undo());
    }

    #[test]
    fn select_resets_history() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let backend = MockBackend::touching();
        let mut session = EditSession::new(&catalog, tmp.path().join("work"));
        session.select(&source).unwrap();
        session.apply(&backend, "emboss").unwrap();

        session.select(&source).unwrap();
        assert_eq!(session.len(), 1);
        assert!(!session.can_undo());
    }

    #[test]
    fn history_timestamps_increase() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let backend = MockBackend::touching();
        let mut session = EditSession::new(&catalog, tmp.path().join("work"));
        session.select(&source).unwrap();
        session.apply(&backend, "sepia").unwrap();
        session.apply(&backend, "sepia").unwrap();

        let history = session.history();
        assert!(history[0].created_at() <= history[1].created_at());
        assert!(history[1].created_at() <= history[2].created_at());
        assert_ne!(history[1].local_path(), history[2].local_path());
    }

    #[test]
    fn output_name_carries_record_timestamp() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let mut session = EditSession::new(&catalog, tmp.path().join("work"));
        session.select(&source).unwrap();

        let record = session.apply(&RustBackend::new(), "blur").unwrap();
        let name = record.local_path().file_name().unwrap().to_string_lossy();
        let parsed = naming::parse_output_name(&name).unwrap();

        assert_eq!(parsed.millis, record.created_at().timestamp_millis());
        assert_eq!(parsed.kind, crate::catalog::FilterKind::Blur);
    }

    #[test]
    fn export_copies_current_image() {
        let (tmp, source) = fixture();
        let catalog = FilterCatalog::standard();
        let mut session = EditSession::new(&catalog, tmp.path().join("work"));
        session.select(&source).unwrap();
        session.apply(&RustBackend::new(), "solarize").unwrap();

        let gallery = tmp.path().join("gallery");
        let exported = session.export(&gallery).unwrap();

        assert!(exported.starts_with(&gallery));
        let name = exported.file_name().unwrap().to_string_lossy().to_string();
        assert!(naming::is_generated_name(&name));
        assert_eq!(
            std::fs::read(&exported).unwrap(),
            std::fs::read(session.current().unwrap().local_path()).unwrap()
        );
    }

    #[test]
    fn export_without_selection_is_empty_error() {
        let tmp = TempDir::new().unwrap();
        let catalog = FilterCatalog::standard();
        let session = EditSession::new(&catalog, tmp.path());
        assert!(matches!(
            session.export(tmp.path()),
            Err(SessionError::Empty)
        ));
    }
}

//! Immutable records describing one image state: the original selection, or
//! the output of one filter application.
//!
//! An [`ImageRecord`] borrows its applied filter from the
//! [`FilterCatalog`](crate::catalog::FilterCatalog) rather than copying it,
//! so records cannot outlive the catalog that produced them.
//!
//! ## Timestamps
//!
//! `created_at` is taken from a process-wide millisecond clock where each
//! reading is `max(wall clock, previous reading + 1ms)`. Records built one
//! after another never go backwards in time, even if the wall clock is
//! adjusted, and no two readings collide, so generated file names stay
//! ordered and unique.

use crate::catalog::FilterDescriptor;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

const ORIGINAL_LABEL: &str = "Original";
const EDITED_LABEL: &str = "Edited image";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

static LAST_MILLIS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current time, strictly later than any previous call in this process.
pub fn monotonic_now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_millis();
    let step = |last: i64| wall.max(last.saturating_add(1));
    let prev = LAST_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(step(last)))
        .unwrap_or_else(|last| last);
    Utc.timestamp_millis_opt(step(prev))
        .single()
        .unwrap_or_else(Utc::now)
}

/// Opaque locator a display layer can resolve to image bytes.
///
/// The core never interprets it. Paths are turned into `file://` URIs; any
/// other scheme can be wrapped with [`ImageHandle::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn from_path(path: &Path) -> Self {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self(format!("file://{}", absolute.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How [`ImageRecord::display_name_with`] labels filtered images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelStyle {
    /// "Original" or a generic "Edited image".
    #[default]
    Generic,
    /// "Original" or the applied filter's display name.
    FilterName,
}

/// One concrete image artifact and its provenance.
#[derive(Debug, Clone)]
pub struct ImageRecord<'c> {
    handle: ImageHandle,
    local_path: PathBuf,
    applied_filter: Option<&'c FilterDescriptor>,
    created_at: DateTime<Utc>,
}

impl<'c> ImageRecord<'c> {
    /// Create a record, stamping it with the current time.
    ///
    /// `applied_filter` is `None` for the unmodified source image.
    pub fn new(
        handle: ImageHandle,
        local_path: impl Into<PathBuf>,
        applied_filter: Option<&'c FilterDescriptor>,
    ) -> Result<Self, RecordError> {
        Self::stamped(handle, local_path, applied_filter, monotonic_now())
    }

    fn stamped(
        handle: ImageHandle,
        local_path: impl Into<PathBuf>,
        applied_filter: Option<&'c FilterDescriptor>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        let local_path = local_path.into();
        if local_path.as_os_str().is_empty() {
            return Err(RecordError::InvalidArgument(
                "image local path must not be empty".into(),
            ));
        }

        Ok(Self {
            handle,
            local_path,
            applied_filter,
            created_at,
        })
    }

    /// Record for an unmodified image, with a `file://` handle.
    pub fn original(local_path: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let local_path = local_path.into();
        Self::new(ImageHandle::from_path(&local_path), local_path, None)
    }

    /// Record for a filter output, with a `file://` handle.
    pub fn filtered(
        local_path: impl Into<PathBuf>,
        filter: &'c FilterDescriptor,
    ) -> Result<Self, RecordError> {
        let local_path = local_path.into();
        Self::new(ImageHandle::from_path(&local_path), local_path, Some(filter))
    }

    /// Like [`filtered`](Self::filtered), stamped with a time the caller
    /// already read from [`monotonic_now`] and used to name the file.
    pub(crate) fn filtered_at(
        local_path: impl Into<PathBuf>,
        filter: &'c FilterDescriptor,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        let local_path = local_path.into();
        Self::stamped(
            ImageHandle::from_path(&local_path),
            local_path,
            Some(filter),
            created_at,
        )
    }

    pub fn handle(&self) -> &ImageHandle {
        &self.handle
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn applied_filter(&self) -> Option<&'c FilterDescriptor> {
        self.applied_filter
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_original(&self) -> bool {
        self.applied_filter.is_none()
    }

    /// "Original" for the source image, "Edited image" for anything filtered.
    ///
    /// The filter name is deliberately not surfaced here; use
    /// [`display_name_with`](Self::display_name_with) with
    /// [`LabelStyle::FilterName`] for that.
    pub fn display_name(&self) -> &str {
        self.display_name_with(LabelStyle::Generic)
    }

    pub fn display_name_with(&self, style: LabelStyle) -> &str {
        match (self.applied_filter, style) {
            (None, _) => ORIGINAL_LABEL,
            (Some(_), LabelStyle::Generic) => EDITED_LABEL,
            (Some(filter), LabelStyle::FilterName) => filter.display_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FilterCatalog;

    #[test]
    fn original_record_has_no_filter() {
        let record = ImageRecord::original("/photos/cat.jpg").unwrap();
        assert!(record.is_original());
        assert!(record.applied_filter().is_none());
        assert_eq!(record.display_name(), "Original");
        assert_eq!(record.local_path(), Path::new("/photos/cat.jpg"));
    }

    #[test]
    fn filtered_record_is_not_original() {
        let catalog = FilterCatalog::standard();
        let sepia = catalog.find_by_key("sepia").unwrap();
        let record = ImageRecord::filtered("/cache/out.png", sepia).unwrap();

        assert!(!record.is_original());
        assert_eq!(record.applied_filter().unwrap().display_name(), "Sepia");
    }

    #[test]
    fn filtered_record_generic_label() {
        let catalog = FilterCatalog::standard();
        let blur = catalog.find_by_key("blur").unwrap();
        let record = ImageRecord::filtered("/cache/out.png", blur).unwrap();
        assert_eq!(record.display_name(), "Edited image");
        assert_eq!(record.display_name_with(LabelStyle::Generic), "Edited image");
    }

    #[test]
    fn filtered_record_filter_name_label() {
        let catalog = FilterCatalog::standard();
        let blur = catalog.find_by_key("blur").unwrap();
        let record = ImageRecord::filtered("/cache/out.png", blur).unwrap();
        assert_eq!(record.display_name_with(LabelStyle::FilterName), "Blur");
    }

    #[test]
    fn original_label_ignores_style() {
        let record = ImageRecord::original("/photos/cat.jpg").unwrap();
        assert_eq!(record.display_name_with(LabelStyle::FilterName), "Original");
    }

    #[test]
    fn empty_local_path_is_invalid() {
        let err = ImageRecord::new(ImageHandle::new("content://media/1"), "", None).unwrap_err();
        assert!(matches!(err, RecordError::InvalidArgument(_)));
    }

    #[test]
    fn handle_is_kept_verbatim() {
        let record =
            ImageRecord::new(ImageHandle::new("content://media/42"), "/tmp/a.jpg", None).unwrap();
        assert_eq!(record.handle().as_str(), "content://media/42");
    }

    #[test]
    fn handle_from_path_is_file_uri() {
        let handle = ImageHandle::from_path(Path::new("/photos/cat.jpg"));
        assert_eq!(handle.as_str(), "file:///photos/cat.jpg");
    }

    #[test]
    fn created_at_is_non_decreasing() {
        let records: Vec<ImageRecord> = (0..50)
            .map(|i| ImageRecord::original(format!("/tmp/{i}.png")).unwrap())
            .collect();
        for pair in records.windows(2) {
            assert!(pair[0].created_at() <= pair[1].created_at());
        }
    }

    #[test]
    fn monotonic_now_never_repeats() {
        let a = monotonic_now();
        let b = monotonic_now();
        assert!(b > a);
    }

    #[test]
    fn label_style_parses_from_toml() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            label: LabelStyle,
        }
        let parsed: Wrapper = toml::from_str(r#"label = "filter-name""#).unwrap();
        assert_eq!(parsed.label, LabelStyle::FilterName);
    }
}

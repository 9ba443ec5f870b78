//! The fixed, ordered set of filters the editor offers.
//!
//! A [`FilterCatalog`] is built once and then only read. It is an ordinary
//! value: construct it with [`FilterCatalog::standard`] (or
//! [`FilterCatalog::new`] for a custom set) and hand a reference to whatever
//! needs it. Nothing in the crate reaches for a global catalog.
//!
//! ## Backend keys
//!
//! Every descriptor carries a backend key such as `"sepia"`. Keys are the
//! only thing that crosses into the imaging backend, and the set of keys the
//! backend understands is closed: [`FilterKind`] enumerates them, and
//! [`FilterKind::key`] / [`FilterKind::from_key`] are the single place where
//! variant and string are mapped. Adding a filter means one new variant here,
//! one catalog line, and one backend arm.
//!
//! ## Ordering
//!
//! Catalog order is presentation order. Filters are grouped by
//! [`FilterCategory`] purely through that order:
//!
//! ```text
//! Tone      grayscale invert sepia posterize solarize autocontrast
//! Detail    blur sharpen find_edges contour emboss
//! Geometry  mirror rotate90
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unknown filter '{key}'. Available: {available}")]
    NotFound { key: String, available: String },
}

/// A backend operation the imaging layer knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Grayscale,
    Invert,
    Sepia,
    Posterize,
    Solarize,
    Autocontrast,
    Blur,
    Sharpen,
    FindEdges,
    Contour,
    Emboss,
    Mirror,
    Rotate90,
}

impl FilterKind {
    /// All operations, in catalog order.
    pub const ALL: [FilterKind; 13] = [
        FilterKind::Grayscale,
        FilterKind::Invert,
        FilterKind::Sepia,
        FilterKind::Posterize,
        FilterKind::Solarize,
        FilterKind::Autocontrast,
        FilterKind::Blur,
        FilterKind::Sharpen,
        FilterKind::FindEdges,
        FilterKind::Contour,
        FilterKind::Emboss,
        FilterKind::Mirror,
        FilterKind::Rotate90,
    ];

    /// The backend key for this operation.
    pub fn key(self) -> &'static str {
        match self {
            FilterKind::Grayscale => "grayscale",
            FilterKind::Invert => "invert",
            FilterKind::Sepia => "sepia",
            FilterKind::Posterize => "posterize",
            FilterKind::Solarize => "solarize",
            FilterKind::Autocontrast => "autocontrast",
            FilterKind::Blur => "blur",
            FilterKind::Sharpen => "sharpen",
            FilterKind::FindEdges => "find_edges",
            FilterKind::Contour => "contour",
            FilterKind::Emboss => "emboss",
            FilterKind::Mirror => "mirror",
            FilterKind::Rotate90 => "rotate90",
        }
    }

    /// Inverse of [`key`](Self::key). Matching ignores ASCII case.
    pub fn from_key(key: &str) -> Option<FilterKind> {
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key))
    }

    pub fn category(self) -> FilterCategory {
        match self {
            FilterKind::Grayscale
            | FilterKind::Invert
            | FilterKind::Sepia
            | FilterKind::Posterize
            | FilterKind::Solarize
            | FilterKind::Autocontrast => FilterCategory::Tone,
            FilterKind::Blur
            | FilterKind::Sharpen
            | FilterKind::FindEdges
            | FilterKind::Contour
            | FilterKind::Emboss => FilterCategory::Detail,
            FilterKind::Mirror | FilterKind::Rotate90 => FilterCategory::Geometry,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FilterKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::from_key(s).ok_or_else(|| not_found(s))
    }
}

/// Presentation group. Derived from [`FilterKind`], never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    Tone,
    Detail,
    Geometry,
}

impl FilterCategory {
    pub fn label(self) -> &'static str {
        match self {
            FilterCategory::Tone => "Tone & color",
            FilterCategory::Detail => "Detail",
            FilterCategory::Geometry => "Geometry",
        }
    }
}

/// One selectable filter: what the user sees and what the backend runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDescriptor {
    display_name: String,
    backend_key: String,
    description: String,
    #[serde(skip)]
    kind: FilterKind,
}

impl FilterDescriptor {
    /// Build a descriptor, rejecting empty names and keys the backend
    /// does not implement.
    pub fn new(
        display_name: impl Into<String>,
        backend_key: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let display_name = display_name.into();
        let backend_key = backend_key.into();

        if display_name.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "filter display name must not be empty".into(),
            ));
        }
        if backend_key.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "filter backend key must not be empty".into(),
            ));
        }
        let kind = FilterKind::from_key(&backend_key).ok_or_else(|| {
            CatalogError::InvalidArgument(format!(
                "backend key '{backend_key}' does not name a backend operation"
            ))
        })?;

        Ok(Self {
            display_name,
            backend_key: kind.key().to_string(),
            description: description.into(),
            kind,
        })
    }

    fn standard(kind: FilterKind, display_name: &str, description: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            backend_key: kind.key().to_string(),
            description: description.to_string(),
            kind,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn backend_key(&self) -> &str {
        &self.backend_key
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn category(&self) -> FilterCategory {
        self.kind.category()
    }
}

/// Ordered, read-only registry of [`FilterDescriptor`]s.
#[derive(Debug, Clone)]
pub struct FilterCatalog {
    filters: Vec<FilterDescriptor>,
    by_key: HashMap<FilterKind, usize>,
}

impl FilterCatalog {
    /// Build a catalog from descriptors in presentation order.
    ///
    /// Fails if the list is empty or two descriptors share a backend key.
    pub fn new(filters: Vec<FilterDescriptor>) -> Result<Self, CatalogError> {
        if filters.is_empty() {
            return Err(CatalogError::InvalidArgument(
                "filter catalog must not be empty".into(),
            ));
        }

        let mut by_key = HashMap::with_capacity(filters.len());
        for (index, filter) in filters.iter().enumerate() {
            if by_key.insert(filter.kind, index).is_some() {
                return Err(CatalogError::InvalidArgument(format!(
                    "duplicate backend key '{}' in catalog",
                    filter.backend_key
                )));
            }
        }

        Ok(Self { filters, by_key })
    }

    /// The catalog the editor ships with.
    pub fn standard() -> Self {
        use FilterKind::*;

        let filters: Vec<FilterDescriptor> = [
            (Grayscale, "Grayscale", "Converts the image to shades of gray."),
            (Invert, "Invert", "Inverts the colors of the image."),
            (Sepia, "Sepia", "Warm brown tone reminiscent of old photographs."),
            (Posterize, "Posterize", "Reduces the number of tones per channel."),
            (Solarize, "Solarize", "Inverts every tone above a brightness threshold."),
            (Autocontrast, "Auto Contrast", "Stretches each channel to the full tonal range."),
            (Blur, "Blur", "Softens the image with a Gaussian blur."),
            (Sharpen, "Sharpen", "Accentuates fine detail."),
            (FindEdges, "Find Edges", "Highlights edges on a dark background."),
            (Contour, "Contour", "Draws edges as dark lines on white."),
            (Emboss, "Emboss", "Gives the image a raised, stamped look."),
            (Mirror, "Mirror", "Flips the image horizontally."),
            (Rotate90, "Rotate 90°", "Rotates the image a quarter turn counter-clockwise."),
        ]
        .into_iter()
        .map(|(kind, name, description)| FilterDescriptor::standard(kind, name, description))
        .collect();

        let by_key = filters
            .iter()
            .enumerate()
            .map(|(index, filter)| (filter.kind, index))
            .collect();

        Self { filters, by_key }
    }

    /// Every filter, in presentation order.
    pub fn list(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterDescriptor> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Always false; an empty catalog cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Look up a filter by backend key.
    pub fn find_by_key(&self, key: &str) -> Result<&FilterDescriptor, CatalogError> {
        FilterKind::from_key(key)
            .and_then(|kind| self.find(kind))
            .ok_or_else(|| self.not_found(key))
    }

    /// Look up a filter by operation. `None` if this catalog does not offer it.
    pub fn find(&self, kind: FilterKind) -> Option<&FilterDescriptor> {
        self.by_key.get(&kind).map(|&index| &self.filters[index])
    }

    fn not_found(&self, key: &str) -> CatalogError {
        CatalogError::NotFound {
            key: key.to_string(),
            available: self
                .filters
                .iter()
                .map(|f| f.backend_key.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl<'a> IntoIterator for &'a FilterCatalog {
    type Item = &'a FilterDescriptor;
    type IntoIter = std::slice::Iter<'a, FilterDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

fn not_found(key: &str) -> CatalogError {
    CatalogError::NotFound {
        key: key.to_string(),
        available: FilterKind::ALL
            .iter()
            .map(|k| k.key())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

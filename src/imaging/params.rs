//! Parameter types for filter operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which decides where
//! a filtered image goes, and the [`backend`](super::backend), which does the
//! pixel work. Swapping in a mock backend does not touch operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`FilterParams`]: tunables for the parameterised filters (posterize, solarize, blur, sepia).
//! - [`FilterRequest`]: one filter application, from source path to output path.

use crate::catalog::FilterKind;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Tunables for the filters that take one.
///
/// Filters without a tunable ignore this struct entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// High bits kept per channel by posterize (1–8).
    pub posterize_bits: u8,
    /// Channel values at or above this are inverted by solarize.
    pub solarize_threshold: u8,
    /// Gaussian standard deviation for blur.
    pub blur_sigma: f32,
    /// Blend between original (0.0) and full sepia tone (1.0).
    pub sepia_intensity: f32,
    /// Encoding quality for lossy outputs.
    pub quality: Quality,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            posterize_bits: 4,
            solarize_threshold: 128,
            blur_sigma: 2.0,
            sepia_intensity: 1.0,
            quality: Quality::default(),
        }
    }
}

/// One filter application.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRequest {
    pub kind: FilterKind,
    pub source: PathBuf,
    pub output: PathBuf,
    pub params: FilterParams,
}

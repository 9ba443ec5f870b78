//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! The primary display for every entity (filter, history entry, batch image)
//! is its semantic identity: positional index and name. File paths are
//! secondary context on indented lines. This keeps the output readable as an
//! inventory while still letting users find the files behind it.
//!
//! # Output Format
//!
//! ## Filters
//!
//! ```text
//! Tone & color
//! 001 Grayscale
//!     Key: grayscale
//!     Converts the image to shades of gray.
//! ...
//! Detail
//! 007 Blur
//!     Key: blur
//!     Softens the image with a Gaussian blur.
//! ```
//!
//! ## Edit history
//!
//! ```text
//! 001 Original
//!     Source: /photos/cat.jpg
//! 002 Edited image
//!     Filter: Sepia
//!     Source: .filterkit/output_1760870400123_sepia.png
//! 003 Edited image (current)
//!     Filter: Blur
//!     Source: .filterkit/output_1760870400188_blur.png
//! ```
//!
//! ## Batch
//!
//! ```text
//! 001 beach.jpg → out/beach-sepia.jpg
//! 002 broken.jpg FAILED
//!     Error: Failed to decode broken.jpg: ...
//!
//! Sepia: 1 applied, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::catalog::{FilterCatalog, FilterDescriptor};
use crate::record::{ImageRecord, LabelStyle};
use std::path::Path;

const DESCRIPTION_WIDTH: usize = 60;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Filters
// ============================================================================

/// Format the catalog grouped by category, keeping catalog order within
/// each group. Indices are catalog positions.
pub fn format_filter_list(catalog: &FilterCatalog) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_category = None;

    for (i, filter) in catalog.iter().enumerate() {
        if current_category != Some(filter.category()) {
            current_category = Some(filter.category());
            lines.push(filter.category().label().to_string());
        }
        lines.push(format!("{} {}", format_index(i + 1), filter.display_name()));
        lines.push(format!("{}Key: {}", indent(1), filter.backend_key()));
        if !filter.description().is_empty() {
            lines.push(format!(
                "{}{}",
                indent(1),
                truncate_desc(filter.description(), DESCRIPTION_WIDTH)
            ));
        }
    }
    lines
}

/// The catalog as a JSON array of descriptors.
pub fn format_filter_json(catalog: &FilterCatalog) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(catalog.list())
}

pub fn print_filter_list(catalog: &FilterCatalog) {
    for line in format_filter_list(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Edit session
// ============================================================================

/// One line announcing a filter result and the size of what was written.
///
/// ```text
/// Sepia → .filterkit/output_1760870400123_sepia.png (640x480)
/// ```
pub fn format_applied(filter: &FilterDescriptor, output: &Path, dims: (u32, u32)) -> String {
    format!(
        "{} \u{2192} {} ({}x{})",
        filter.display_name(),
        output.display(),
        dims.0,
        dims.1
    )
}

/// Format the edit history, oldest first, marking the newest entry.
pub fn format_history(history: &[ImageRecord<'_>], style: LabelStyle) -> Vec<String> {
    let mut lines = Vec::new();
    let last = history.len().saturating_sub(1);

    for (i, record) in history.iter().enumerate() {
        let label = record.display_name_with(style);
        if i == last {
            lines.push(format!("{} {} (current)", format_index(i + 1), label));
        } else {
            lines.push(format!("{} {}", format_index(i + 1), label));
        }
        if let Some(filter) = record.applied_filter() {
            lines.push(format!("{}Filter: {}", indent(1), filter.display_name()));
        }
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            record.local_path().display()
        ));
    }
    lines
}

pub fn print_history(history: &[ImageRecord<'_>], style: LabelStyle) {
    for line in format_history(history, style) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Applied {
            index,
            source,
            output,
            ..
        } => vec![format!(
            "{} {} \u{2192} {}",
            format_index(*index),
            file_name(source),
            output.display()
        )],
        BatchEvent::Failed {
            index,
            source,
            reason,
            ..
        } => vec![
            format!("{} {} FAILED", format_index(*index), file_name(source)),
            format!("{}Error: {}", indent(1), reason),
        ],
    }
}

/// Closing line of a batch run.
pub fn format_batch_summary(filter: &FilterDescriptor, summary: &BatchSummary) -> String {
    if summary.total() == 0 {
        return format!("{}: no images found", filter.display_name());
    }
    format!(
        "{}: {} applied, {} failed",
        filter.display_name(),
        summary.applied,
        summary.failed
    )
}

// ============================================================================
// Tests
// ============================================================================

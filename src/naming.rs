//! Centralized file naming for everything the editor writes.
//!
//! Three kinds of generated file exist:
//!
//! | Kind | Pattern | Example |
//! |---|---|---|
//! | Session output | `output_{millis}_{key}.{ext}` | `output_1760870400123_find_edges.png` |
//! | Batch output | `{stem}-{key}.{ext}` | `beach-sepia.jpg` |
//! | Export | `edited_{millis}.{ext}` | `edited_1760870400456.png` |
//!
//! `millis` is the creation timestamp of the record the file belongs to, so
//! session outputs sort in the order they were produced. Backend keys may
//! contain underscores (`find_edges`); the timestamp never does, which is
//! what makes [`parse_output_name`] unambiguous.

use crate::catalog::FilterKind;
use crate::imaging::rust_backend::supported_input_extensions;
use chrono::{DateTime, Utc};
use std::path::Path;

const OUTPUT_PREFIX: &str = "output_";
const EXPORT_PREFIX: &str = "edited_";

/// Result of parsing a generated session output name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedOutput {
    pub millis: i64,
    pub kind: FilterKind,
}

/// `output_{millis}_{key}.{ext}`
pub fn output_file_name(created_at: DateTime<Utc>, kind: FilterKind, ext: &str) -> String {
    format!(
        "{OUTPUT_PREFIX}{}_{}.{}",
        created_at.timestamp_millis(),
        kind.key(),
        ext
    )
}

/// `{stem}-{key}.{ext}`
pub fn batch_file_name(stem: &str, kind: FilterKind, ext: &str) -> String {
    format!("{stem}-{}.{ext}", kind.key())
}

/// `edited_{millis}.{ext}`
pub fn export_file_name(created_at: DateTime<Utc>, ext: &str) -> String {
    format!("{EXPORT_PREFIX}{}.{ext}", created_at.timestamp_millis())
}

/// Recover timestamp and operation from a session output name.
///
/// - `"output_1700000000000_sepia.png"` → millis=1700000000000, kind=Sepia
/// - `"output_1700000000000_find_edges.jpg"` → kind=FindEdges
/// - `"output_abc_sepia.png"` → None
/// - `"beach.jpg"` → None
pub fn parse_output_name(name: &str) -> Option<ParsedOutput> {
    let rest = name.strip_prefix(OUTPUT_PREFIX)?;
    let (millis, tail) = rest.split_once('_')?;
    let millis = millis.parse::<i64>().ok()?;
    let key = tail.rsplit_once('.').map_or(tail, |(stem, _)| stem);
    let kind = FilterKind::from_key(key)?;
    Some(ParsedOutput { millis, kind })
}

/// True for names this crate generates as session output or export copies.
pub fn is_generated_name(name: &str) -> bool {
    if parse_output_name(name).is_some() {
        return true;
    }
    name.strip_prefix(EXPORT_PREFIX)
        .and_then(|rest| rest.split('.').next())
        .is_some_and(|millis| !millis.is_empty() && millis.parse::<i64>().is_ok())
}

/// True if the path has an extension with a compiled-in decoder.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Lowercased extension of `path`, or `fallback` if it has none.
pub fn extension_or<'a>(path: &'a Path, fallback: &'a str) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or(fallback)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn output_name_embeds_millis_and_key() {
        let name = output_file_name(at(1_700_000_000_123), FilterKind::Sepia, "png");
        assert_eq!(name, "output_1700000000123_sepia.png");
    }

    #[test]
    fn output_name_parses_back() {
        let name = output_file_name(at(42), FilterKind::FindEdges, "jpg");
        assert_eq!(
            parse_output_name(&name),
            Some(ParsedOutput {
                millis: 42,
                kind: FilterKind::FindEdges
            })
        );
    }

    #[test]
    fn parse_rejects_bad_millis() {
        assert_eq!(parse_output_name("output_abc_sepia.png"), None);
    }

    #[test]
    fn parse_rejects_unknown_key() {
        assert_eq!(parse_output_name("output_12_vintage.png"), None);
    }

    #[test]
    fn parse_rejects_plain_photo() {
        assert_eq!(parse_output_name("beach.jpg"), None);
        assert_eq!(parse_output_name("output.jpg"), None);
    }

    #[test]
    fn parse_without_extension() {
        assert_eq!(
            parse_output_name("output_7_mirror"),
            Some(ParsedOutput {
                millis: 7,
                kind: FilterKind::Mirror
            })
        );
    }

    #[test]
    fn batch_name_uses_stem() {
        assert_eq!(
            batch_file_name("beach", FilterKind::Rotate90, "webp"),
            "beach-rotate90.webp"
        );
    }

    #[test]
    fn export_name_is_generated() {
        let name = export_file_name(at(99), "png");
        assert_eq!(name, "edited_99.png");
        assert!(is_generated_name(&name));
    }

    #[test]
    fn generated_name_detection() {
        assert!(is_generated_name("output_5_blur.png"));
        assert!(!is_generated_name("edited_.png"));
        assert!(!is_generated_name("edited_photos.png"));
        assert!(!is_generated_name("holiday.jpg"));
    }

    #[test]
    fn supported_image_ignores_case() {
        assert!(is_supported_image(Path::new("a/B.JPG")));
        assert!(is_supported_image(Path::new("c.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("README")));
    }

    #[test]
    fn extension_falls_back() {
        assert_eq!(extension_or(Path::new("a.PNG"), "jpg"), "png");
        assert_eq!(extension_or(Path::new("a"), "jpg"), "jpg");
    }
}

//! Storage-safe name resolution.
//!
//! A logical name supplied by a client is reduced to a single path component
//! that cannot leave the storage root. The result is deterministic: the same
//! logical name always resolves to the same base name.

use std::path::Path;

use sanitize_filename::Options;

use super::MAX_FILENAME_LENGTH;
use crate::{FiledropError, Result};

const REPLACEMENT: &str = "_";

/// Resolve a client supplied name to a storage-safe file name.
///
/// Only the last path segment survives, leading dots are removed and the
/// remainder is passed through `sanitize-filename` with Windows rules so the
/// stored name is portable.
pub fn resolve_name(logical_name: &str) -> Result<String> {
    let last_segment = logical_name
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or("");

    let trimmed = last_segment.trim_start_matches('.').trim();
    if trimmed.is_empty() {
        return Err(FiledropError::Validation(format!(
            "name {logical_name:?} does not contain a usable file name"
        )));
    }

    let sanitized = sanitize_filename::sanitize_with_options(
        trimmed,
        Options {
            windows: true,
            truncate: true,
            replacement: REPLACEMENT,
        },
    );
    let sanitized = sanitized.trim_start_matches('.').trim();

    if sanitized.is_empty() {
        return Err(FiledropError::Validation(format!(
            "name {logical_name:?} does not contain a usable file name"
        )));
    }

    Ok(sanitized.to_string())
}

/// Check that `name` is already a resolved name.
///
/// Used when a name comes back from a client for lookup, so nothing that
/// would resolve differently can reach the filesystem.
pub fn ensure_resolved(name: &str) -> Result<()> {
    match resolve_name(name) {
        Ok(resolved) if resolved == name => Ok(()),
        _ => Err(FiledropError::Validation(format!(
            "{name:?} is not a stored file name"
        ))),
    }
}

/// Build the `n`th collision candidate for a resolved name.
///
/// `photo.jpg` becomes `photo-1.jpg`, `photo-2.jpg`, ... The stem is cut on a
/// character boundary so the candidate never exceeds the filename limit.
pub fn candidate_name(resolved: &str, n: u32) -> String {
    if n == 0 {
        return resolved.to_string();
    }

    let path = Path::new(resolved);
    let (stem, ext) = match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|s| s.to_str()),
    ) {
        (Some(stem), Some(ext)) => (stem, format!(".{ext}")),
        _ => (resolved, String::new()),
    };

    let suffix = format!("-{n}{ext}");
    let budget = MAX_FILENAME_LENGTH.saturating_sub(suffix.len());

    let mut end = stem.len().min(budget);
    while !stem.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{suffix}", &stem[..end])
}

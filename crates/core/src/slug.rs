//! Slug generation and per-scope collision resolution.
//!
//! A slug is derived from free text by [`slugify`], then made unique within
//! its parent scope by [`resolve_unique_slug`], which appends `-1`, `-2`, ...
//! until it finds a candidate no active sibling holds. Soft-deleted rows get a
//! [`tombstone_slug`] so the readable slug becomes available again.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::text::normalize;

/// Upper bound on suffix probing before giving up with a conflict.
pub const MAX_SLUG_ATTEMPTS: u32 = 10_000;

/// Maximum slug length in characters.
pub const MAX_SLUG_LENGTH: usize = 200;

/// Convert free text into a URL-safe slug (`[a-z0-9-]`).
///
/// Normalizes accents away, lowercases, turns whitespace runs into a single
/// hyphen, drops every other character, then collapses repeated hyphens and
/// trims them from both ends. May return an empty string.
pub fn slugify(raw: &str) -> String {
    let normalized = normalize(raw).to_lowercase();

    let mut slug = String::with_capacity(normalized.len());
    let mut prev_hyphen = true;
    for c in normalized.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' {
            if !prev_hyphen {
                slug.push('-');
            }
            prev_hyphen = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            prev_hyphen = false;
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
    }
    slug.trim_end_matches('-').to_string()
}

/// Validate a slug (non-empty, lowercase alphanumerics and hyphens only).
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation(
            "Slug must not be empty (the source text has no usable characters)".into(),
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric characters and hyphens".into(),
        ));
    }
    Ok(())
}

/// `base-n`, with `base` shortened so the result fits in [`MAX_SLUG_LENGTH`].
pub fn with_suffix(base: &str, n: u32) -> String {
    let suffix = format!("-{n}");
    let stem = truncate_stem(base, MAX_SLUG_LENGTH.saturating_sub(suffix.len()));
    format!("{stem}{suffix}")
}

/// Longest prefix shared by `base` and every candidate
/// [`resolve_unique_slug`] may try for it.
pub fn candidate_prefix(base: &str) -> &str {
    let longest_suffix = MAX_SLUG_ATTEMPTS.to_string().len() + 1;
    truncate_stem(base, MAX_SLUG_LENGTH.saturating_sub(longest_suffix))
}

fn truncate_stem(base: &str, max_chars: usize) -> &str {
    let end = base
        .char_indices()
        .nth(max_chars)
        .map_or(base.len(), |(i, _)| i);
    base[..end].trim_end_matches('-')
}

/// Return the first of `base`, `base-1`, `base-2`, ... that is not in `taken`.
///
/// `taken` holds the slugs of the *other* active items in the scope. Fails
/// with [`CoreError::Conflict`] only after [`MAX_SLUG_ATTEMPTS`] suffixes.
pub fn resolve_unique_slug(base: &str, taken: &HashSet<String>) -> Result<String, CoreError> {
    if !taken.contains(base) {
        return Ok(base.to_string());
    }
    (1..=MAX_SLUG_ATTEMPTS)
        .map(|n| with_suffix(base, n))
        .find(|candidate| !taken.contains(candidate))
        .ok_or_else(|| {
            CoreError::Conflict(format!(
                "Could not find a free slug for '{base}' after {MAX_SLUG_ATTEMPTS} attempts"
            ))
        })
}

/// Placeholder slug for a soft-deleted row. Never produced by [`slugify`]
/// for real titles in practice, and never compared against active slugs.
pub fn tombstone_slug() -> String {
    uuid::Uuid::new_v4().to_string()
}

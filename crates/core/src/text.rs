//! Text normalization for titles, descriptions and slug input.
//!
//! Accented letters are reduced to their base letter via canonical
//! decomposition, a few letters that do not decompose are transliterated,
//! and anything still outside ASCII is dropped.

use unicode_normalization::UnicodeNormalization;

use crate::error::CoreError;

/// Letters mapped explicitly because NFD leaves them intact (or because the
/// mapping must hold regardless of the input's normalization form).
const TRANSLITERATIONS: &[(char, &str)] = &[
    ('ñ', "n"),
    ('Ñ', "N"),
    ('ß', "ss"),
    ('æ', "ae"),
    ('Æ', "AE"),
    ('œ', "oe"),
    ('Œ', "OE"),
    ('ø', "o"),
    ('Ø', "O"),
    ('đ', "d"),
    ('Đ', "D"),
    ('ł', "l"),
    ('Ł', "L"),
];

/// Combining Diacritical Marks block.
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Strip accents and non-ASCII characters, then trim surrounding whitespace.
///
/// Pure and infallible; the result may be empty.
pub fn normalize(text: &str) -> String {
    let mut mapped = String::with_capacity(text.len());
    for c in text.chars() {
        match TRANSLITERATIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => mapped.push_str(to),
            None => mapped.push(c),
        }
    }

    let stripped: String = mapped
        .nfd()
        .filter(|c| !is_diacritic(*c))
        .filter(char::is_ascii)
        .collect();

    stripped.trim().to_string()
}

/// Maximum title length in characters, after normalization.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Normalize a title and reject it if nothing usable remains or it is too long.
pub fn sanitize_title(title: &str) -> Result<String, CoreError> {
    let title = normalize(title);
    if title.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(title)
}

/// Turn a free-text search query into a case-insensitive `LIKE` pattern.
///
/// The query is normalized the same way stored titles are, lowercased, and
/// `LIKE` metacharacters are escaped with a backslash. Compare it against
/// `lower(column)`.
pub fn search_pattern(query: &str) -> Result<String, CoreError> {
    let needle = normalize(query).to_lowercase();
    if needle.is_empty() {
        return Err(CoreError::Validation("Search query must not be empty".into()));
    }
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Ok(pattern)
}

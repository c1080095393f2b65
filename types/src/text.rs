//! Text helpers for error metadata.

/// Characters of serialized props kept in error metadata.
pub const META_PREVIEW_CHARS: usize = 100;

/// Shorten serialized props for error metadata.
///
/// Strings of at most [`META_PREVIEW_CHARS`] characters are returned as-is.
/// Longer ones keep that many characters followed by `...`.
#[must_use]
pub fn truncate_meta(raw: &str) -> String {
    match raw.char_indices().nth(META_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw.to_string(),
    }
}

//! Free-text gate for strings pulled from the analysis payload.
//!
//! Upstream services occasionally return debug or unfinished text. Anything
//! matching the denylist is treated as absent so the caller substitutes its
//! own fallback sentence.

use crate::pdf::unencodable_chars;

/// Case-insensitive substrings that mark a value as unfinished.
pub const PLACEHOLDER_PHRASES: &[&str] = &[
    "coming soon",
    "placeholder",
    "needs verification",
    "lorem ipsum",
    "not yet implemented",
    "to be determined",
    "analysis pending",
    "[insert",
    "[object object]",
];

/// Whole-value sentinels produced by upstream serializers for missing data.
const EMPTY_SENTINELS: &[&str] = &[
    "undefined",
    "null",
    "none",
    "nan",
    "n/a",
    "[object object]",
    "{}",
    "[]",
];

pub fn is_placeholder(text: &str) -> bool {
    let lowered = text.to_lowercase();
    PLACEHOLDER_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

fn is_empty_sentinel(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    EMPTY_SENTINELS.iter().any(|sentinel| lowered == *sentinel)
}

/// Text the report fonts cannot show any of would print as a row of `?`.
fn is_unprintable(text: &str) -> bool {
    let visible = text.chars().filter(|ch| !ch.is_whitespace()).count();
    unencodable_chars(text) >= visible
}

/// Returns the trimmed, whitespace-collapsed text, or `None` when it is
/// blank, a sentinel, contains a placeholder phrase, or has no character
/// the report fonts can draw.
pub fn clean_text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() || is_empty_sentinel(&collapsed) || is_placeholder(&collapsed) {
        return None;
    }
    if is_unprintable(&collapsed) {
        log::trace!("dropping text with no drawable characters: {:?}", collapsed);
        return None;
    }
    Some(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_rejected_case_insensitively() {
        assert_eq!(clean_text("Detailed analysis Coming Soon!"), None);
        assert_eq!(clean_text("PLACEHOLDER text"), None);
        assert_eq!(clean_text("claim needs verification"), None);
        assert_eq!(clean_text("Written by [object Object]"), None);
    }

    #[test]
    fn sentinels_are_rejected_only_as_whole_values() {
        assert_eq!(clean_text("undefined"), None);
        assert_eq!(clean_text("  [object Object] "), None);
        assert_eq!(clean_text("NaN"), None);
        assert_eq!(
            clean_text("The null hypothesis was rejected"),
            Some("The null hypothesis was rejected".to_string())
        );
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(
            clean_text("  two\n\n words\t"),
            Some("two words".to_string())
        );
        assert_eq!(clean_text("   "), None);
    }

    #[test]
    fn text_without_drawable_characters_is_absent() {
        assert_eq!(clean_text("\u{4E2D}\u{6587}"), None);
        assert_eq!(clean_text(" \u{65E5}\u{672C} \u{8A9E} "), None);
        assert_eq!(
            clean_text("\u{4E2D}\u{6587} Daily"),
            Some("\u{4E2D}\u{6587} Daily".to_string())
        );
        assert_eq!(clean_text("Caf\u{e9} \u{2265} 3"), Some("Caf\u{e9} \u{2265} 3".to_string()));
    }
}

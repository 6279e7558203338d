//! Small text helpers shared by list and quiz renderings.

/// Number of characters kept by [`preview`] before the ellipsis.
pub const PREVIEW_CHARS: usize = 11;

/// Shortens `text` to at most `limit` characters followed by `...`.
///
/// Counts `char`s, not bytes, so multi-byte text is never split.
#[must_use]
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// List-row preview of a question text.
#[must_use]
pub fn preview(text: &str) -> String {
    truncate(text, PREVIEW_CHARS)
}

const LETTER_COUNT: usize = 26;

/// Letter label for the option at `index` (`A`, `B`, ...).
///
/// Past `Z` the label falls back to the 1-based position.
#[must_use]
pub fn option_label(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| usize::from(*i) < LETTER_COUNT)
        .map_or_else(|| (index + 1).to_string(), |i| char::from(b'A' + i).to_string())
}

/// Inverse of [`option_label`]. Letters are case-insensitive; numbers are
/// only accepted where [`option_label`] would produce them.
#[must_use]
pub fn option_index(label: &str) -> Option<usize> {
    let label = label.trim();
    let mut chars = label.chars();
    let first = chars.next()?;
    if first.is_ascii_alphabetic() && chars.next().is_none() {
        return Some(usize::from(first.to_ascii_uppercase() as u8 - b'A'));
    }
    label
        .parse::<usize>()
        .ok()
        .filter(|n| *n > LETTER_COUNT)
        .map(|n| n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(preview("Capital?"), "Capital?");
        assert_eq!(preview("exactly 11!"), "exactly 11!");
    }

    #[test]
    fn long_text_gets_ellipsis() {
        assert_eq!(preview("What is the capital of France?"), "What is the...");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("Qual é a capital?", 6), "Qual é...");
    }

    #[test]
    fn labels_round_trip() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(3), "D");
        assert_eq!(option_label(30), "31");
        assert_eq!(option_index("b"), Some(1));
        assert_eq!(option_index(" D "), Some(3));
        assert_eq!(option_index("AB"), None);
        assert_eq!(option_index("1"), None);
    }

    #[test]
    fn numeric_labels_past_z_read_back() {
        for index in [25, 26, 27, 40] {
            assert_eq!(option_index(&option_label(index)), Some(index));
        }
        assert_eq!(option_label(26), "27");
        assert_eq!(option_index("26"), None);
        assert_eq!(option_index("0"), None);
        assert_eq!(option_index("-3"), None);
    }
}

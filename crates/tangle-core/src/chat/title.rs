//! Chat title synthesis from the first user message.
//!
//! Pure string functions: collapse whitespace, keep short inputs verbatim,
//! and truncate long ones at a word boundary with an ellipsis. Invoked once
//! per new chat; first non-default title wins, and the synthesizer never
//! overwrites a user-customized title (callers check [`is_default_title`]).

/// Maximum title length in characters, excluding the ellipsis marker.
pub const MAX_TITLE_CHARS: usize = 40;

/// A word boundary is only used if it falls past this character position;
/// earlier boundaries would leave a uselessly short title.
const MIN_BOUNDARY_CHARS: usize = 20;

const ELLIPSIS: char = '\u{2026}';

/// Placeholder titles that count as "no real title yet".
pub const DEFAULT_TITLES: &[&str] = &["New Chat", "Untitled Chat", "Chat"];

/// Derive a human-readable chat title from the first user message.
///
/// Whitespace runs are collapsed to single spaces. Content of at most
/// [`MAX_TITLE_CHARS`] characters is returned as-is; longer content is cut
/// at 40 characters, backtracked to the last word boundary when that
/// boundary lies past character 20, and suffixed with an ellipsis.
pub fn synthesize_title(first_user_message: &str) -> String {
    let collapsed = first_user_message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let chars: Vec<char> = collapsed.chars().collect();
    if chars.len() <= MAX_TITLE_CHARS {
        return collapsed;
    }

    let cut = &chars[..MAX_TITLE_CHARS];
    let keep = match cut.iter().rposition(|c| *c == ' ') {
        Some(boundary) if boundary > MIN_BOUNDARY_CHARS => &cut[..boundary],
        _ => cut,
    };

    let mut title: String = keep.iter().collect();
    title.push(ELLIPSIS);
    title
}

/// Whether a title is still a placeholder the synthesizer may overwrite.
pub fn is_default_title(title: Option<&str>) -> bool {
    match title {
        None => true,
        Some(t) => DEFAULT_TITLES.contains(&t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_returned_unchanged() {
        assert_eq!(synthesize_title("hi"), "hi");
        assert_eq!(synthesize_title("Plan a trip to Japan"), "Plan a trip to Japan");
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(synthesize_title("  hello \n  world\t"), "hello world");
    }

    #[test]
    fn exactly_forty_chars_is_kept_verbatim() {
        let input = "a".repeat(40);
        assert_eq!(synthesize_title(&input), input);
    }

    #[test]
    fn long_input_truncates_at_word_boundary() {
        let input = "Can you help me understand how neural networks learn from data?";
        let title = synthesize_title(input);

        assert!(title.ends_with('\u{2026}'));
        let without_ellipsis: String = title.chars().take(title.chars().count() - 1).collect();
        assert_eq!(without_ellipsis, "Can you help me understand how neural");
        assert!(without_ellipsis.chars().count() <= MAX_TITLE_CHARS);
        // Backtracked to a boundary, so no mid-word cut.
        assert!(!without_ellipsis.ends_with(' '));
    }

    #[test]
    fn early_boundary_forces_hard_cut() {
        // Single space at position 3, well before character 20: the word
        // boundary is ignored and the cut is hard at 40.
        let input = format!("abc {}", "x".repeat(60));
        let title = synthesize_title(&input);
        assert!(title.ends_with('\u{2026}'));
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS + 1);
    }

    #[test]
    fn unbroken_input_is_hard_cut() {
        let input = "x".repeat(80);
        let title = synthesize_title(&input);
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS + 1);
        assert!(title.ends_with('\u{2026}'));
    }

    #[test]
    fn default_title_detection() {
        assert!(is_default_title(None));
        assert!(is_default_title(Some("New Chat")));
        assert!(is_default_title(Some("Untitled Chat")));
        assert!(is_default_title(Some("Chat")));
        assert!(!is_default_title(Some("Plan a trip to Japan")));
        assert!(!is_default_title(Some("new chat"))); // exact match only
    }
}

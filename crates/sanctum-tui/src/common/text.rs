//! Text utilities for TUI rendering.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Glyph used to mask secret input.
pub const MASK_CHAR: char = '•';

/// Truncates a string with ellipsis if it exceeds `max_width` terminal columns.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut truncated = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width + 1 > max_width {
            break;
        }
        width += ch_width;
        truncated.push(ch);
    }
    truncated.push('…');
    truncated
}

/// Strips escape bytes and expands tabs in text that came from the service.
pub fn sanitize_for_display(s: &str) -> Cow<'_, str> {
    if s.contains('\x1b') || s.contains('\t') || s.contains('\n') {
        Cow::Owned(
            s.replace('\x1b', "")
                .replace('\t', "    ")
                .replace('\n', " "),
        )
    } else {
        Cow::Borrowed(s)
    }
}

/// One mask glyph per character of `secret`.
pub fn mask(secret: &str) -> String {
    std::iter::repeat_n(MASK_CHAR, secret.chars().count()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_and_exact() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate_with_ellipsis("hello world", 8), "hello w…");
        assert_eq!(truncate_with_ellipsis("hello", 1), "…");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK glyph is two columns.
        assert_eq!(truncate_with_ellipsis("中文test", 6), "中文t…");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_for_display("clean"), "clean");
        assert!(matches!(sanitize_for_display("clean"), Cow::Borrowed(_)));
        assert_eq!(sanitize_for_display("a\tb\nc\x1b[0m"), "a    b c[0m");
    }

    #[test]
    fn test_mask_counts_chars() {
        assert_eq!(mask("pässw"), "•••••");
        assert_eq!(mask(""), "");
    }
}

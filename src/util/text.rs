use std::borrow::Cow;

/// Replaces every literal `&` with the `&amp;` entity.
///
/// This is the only character escaped ahead of the XML writer. The writer still
/// escapes `<` and `>` in element text, and CDATA sections bypass escaping entirely.
///
/// Returns `Cow::Borrowed` when the input contains no ampersand (common case).
///
/// # Examples
///
/// ```
/// use rss_writer::util::escape_ampersand;
///
/// assert_eq!(escape_ampersand("test&test"), "test&amp;test");
/// assert_eq!(escape_ampersand("plain"), "plain");
/// ```
pub fn escape_ampersand(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace('&', "&amp;"))
}

/// Removes NUL bytes and every other character XML 1.0 forbids before text
/// becomes element or attribute content.
///
/// Dropped: the C0 controls 0x00-0x08, 0x0B-0x0C and 0x0E-0x1F, plus the
/// noncharacters U+FFFE and U+FFFF. Tab, newline and carriage return are kept.
/// Nothing is reported; the characters simply disappear.
///
/// Returns `Cow::Borrowed` when the input has nothing to remove (common case).
///
/// # Examples
///
/// ```
/// use rss_writer::util::strip_invalid_chars;
///
/// assert_eq!(strip_invalid_chars("test\0test"), "testtest");
/// assert_eq!(strip_invalid_chars("bell\u{7}here"), "bellhere");
/// ```
pub fn strip_invalid_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_invalid_xml_char) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|&c| !is_invalid_xml_char(c)).collect())
}

fn is_invalid_xml_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_single_ampersand() {
        assert_eq!(escape_ampersand("test&test"), "test&amp;test");
    }

    #[test]
    fn test_escape_leaves_other_markup_alone() {
        // `<`, `>` and quotes are the writer's job
        assert_eq!(
            escape_ampersand("<a href=\"x\">&</a>"),
            "<a href=\"x\">&amp;</a>"
        );
    }

    #[test]
    fn test_escape_existing_entity_is_escaped_again() {
        assert_eq!(escape_ampersand("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_escape_clean_text_returns_borrowed() {
        let result = escape_ampersand("nothing to see here");
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_empty_string() {
        let result = escape_ampersand("");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "");
    }

    #[test]
    fn test_strip_removes_every_nul() {
        assert_eq!(strip_invalid_chars("test\0test"), "testtest");
        assert_eq!(strip_invalid_chars("\0a\0\0b\0"), "ab");
        assert_eq!(strip_invalid_chars("\0"), "");
    }

    #[test]
    fn test_strip_removes_c0_controls() {
        // SOH, BEL, BS, VT, FF, ESC, US
        assert_eq!(
            strip_invalid_chars("a\u{1}b\u{7}c\u{8}d\u{B}e\u{C}f\u{1B}g\u{1F}h"),
            "abcdefgh"
        );
    }

    #[test]
    fn test_strip_removes_noncharacters() {
        assert_eq!(strip_invalid_chars("x\u{FFFE}y\u{FFFF}z"), "xyz");
    }

    #[test]
    fn test_strip_keeps_legal_whitespace() {
        let result = strip_invalid_chars("tab\there\nline\r\n");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "tab\there\nline\r\n");
    }

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        let result = strip_invalid_chars("日本語のテキスト\u{7F}");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "日本語のテキスト\u{7F}");
    }

    proptest! {
        #[test]
        fn prop_escaped_text_has_no_bare_ampersand(s in ".*") {
            let escaped = escape_ampersand(&s);
            for (idx, _) in escaped.match_indices('&') {
                prop_assert!(escaped[idx..].starts_with("&amp;"));
            }
            prop_assert_eq!(escaped.replace("&amp;", "&"), s);
        }

        #[test]
        fn prop_stripped_text_is_xml_legal(s in ".*") {
            let stripped = strip_invalid_chars(&s);
            prop_assert!(!stripped.chars().any(is_invalid_xml_char));
            let expected: String = s.chars().filter(|&c| !is_invalid_xml_char(c)).collect();
            prop_assert_eq!(stripped.into_owned(), expected);
        }
    }
}

// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn leaves_plain_text_untouched() {
    assert_eq!(shell_escape_value("my-bucket"), "my-bucket");
}

#[test]
fn escapes_dollar_sign() {
    assert_eq!(shell_escape_value("$HOME"), "\\x24HOME");
}

#[test]
fn escapes_double_and_single_quotes() {
    assert_eq!(shell_escape_value("a\"b'c"), "a\\x22b\\x27c");
}

#[test]
fn escapes_braces_and_percent() {
    assert_eq!(shell_escape_value("{x}%y"), "\\x7bx\\x7d\\x25y");
}

#[test]
fn escapes_backslash() {
    assert_eq!(shell_escape_value("a\\b"), "a\\x5cb");
}

proptest::proptest! {
    #[test]
    fn dangerous_chars_never_survive_unescaped(s in "[ -~]{0,40}") {
        let escaped = shell_escape_value(&s);
        for ch in ['$', '%', '{', '}', '"', '\''] {
            let expected_occurrences = s.matches(ch).count();
            let expected_marker = format!("\\x{:02x}", ch as u32);
            let marker_occurrences = escaped.matches(&expected_marker).count();
            proptest::prop_assert_eq!(expected_occurrences, marker_occurrences);
        }
    }
}

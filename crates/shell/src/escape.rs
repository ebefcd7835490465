// SPDX-License-Identifier: MIT

//! The shell-escape rule used when interpolating pipe `variables` values
//! into a `docker run -e K="V"` command (spec.md §4.6): each of
//! `\ $ % { } " '` is replaced with its `\xNN` hex escape.

const ESCAPED_CHARS: &[char] = &['\\', '$', '%', '{', '}', '"', '\''];

/// Escapes `value` for safe interpolation inside a double-quoted shell
/// argument.
pub fn shell_escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ESCAPED_CHARS.contains(&ch) {
            let mut buf = [0u8; 4];
            let bytes = ch.encode_utf8(&mut buf).as_bytes();
            for byte in bytes {
                out.push_str(&format!("\\x{byte:02x}"));
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
#[path = "escape_tests.rs"]
mod tests;

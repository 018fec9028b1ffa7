// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

/// `Debug`-format a value, then escape any control or non-ASCII characters
/// so the result fits on one log line.
pub(crate) fn to_escaped_string<T: fmt::Debug>(x: &T) -> String {
    let string = format!("{x:?}");
    string.chars().flat_map(|c| c.escape_default()).collect()
}

/// If `c` is an ASCII letter, return the corresponding lowercase
/// letter, otherwise None.
pub(crate) fn lower_ascii_letter(c: char) -> Option<char> {
    match c {
        'a'..='z' => Some(c),
        'A'..='Z' => Some((c as u8 - b'A' + b'a') as char),
        _ => None,
    }
}

/// Whitespace as the tokenizer and tree builder see it: tab, LF, FF, CR
/// and space. U+000B is not included.
pub(crate) fn is_html_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

#[cfg(test)]
#[allow(non_snake_case)]
mod test {
    use super::{is_html_whitespace, lower_ascii_letter, to_escaped_string};

    #[test]
    fn lower_letter_a_is_a() {
        assert_eq!(lower_ascii_letter('a'), Some('a'));
    }

    #[test]
    fn lower_letter_A_is_a() {
        assert_eq!(lower_ascii_letter('A'), Some('a'));
    }

    #[test]
    fn lower_letter_symbol_is_None() {
        assert_eq!(lower_ascii_letter('!'), None);
    }

    #[test]
    fn lower_letter_nonascii_is_None() {
        assert_eq!(lower_ascii_letter('\u{a66e}'), None);
    }

    #[test]
    fn vertical_tab_is_not_whitespace() {
        assert!(is_html_whitespace('\x0C'));
        assert!(!is_html_whitespace('\x0B'));
    }

    #[test]
    fn escaped_debug_string() {
        assert_eq!(to_escaped_string(&"é"), r#"\"\u{e9}\""#);
    }
}
